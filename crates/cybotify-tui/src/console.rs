//! ConsoleLayer — forwards WARN/ERROR events to the in-app log panel.

use tokio::sync::broadcast;

pub struct ConsoleLayer {
    sender: broadcast::Sender<String>,
}

impl ConsoleLayer {
    pub fn new(sender: broadcast::Sender<String>) -> Self {
        Self { sender }
    }
}

impl<S> tracing_subscriber::Layer<S> for ConsoleLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let level = event.metadata().level();
        if !matches!(*level, tracing::Level::WARN | tracing::Level::ERROR) {
            return;
        }

        let mut message = format!("{} [{}] ", chrono::Local::now().format("%H:%M:%S"), level);
        let mut visitor = MessageVisitor(&mut message);
        event.record(&mut visitor);

        // No receivers yet is fine.
        let _ = self.sender.send(message);
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl<'a> tracing::field::Visit for MessageVisitor<'a> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0.push_str(&format!("{:?}", value));
        } else {
            self.0.push_str(&format!(" {}={:?}", field.name(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_only_warnings_and_errors_are_forwarded() {
        let (tx, mut rx) = broadcast::channel(16);
        let subscriber = tracing_subscriber::registry().with(ConsoleLayer::new(tx));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("ignored");
            tracing::warn!(stage = "features", "dropping stage frame");
            tracing::error!("socket gone");
        });

        let first = rx.try_recv().unwrap();
        assert!(first.contains("[WARN] dropping stage frame"));
        assert!(first.ends_with("stage=\"features\""));
        assert!(rx.try_recv().unwrap().contains("[ERROR] socket gone"));
        assert!(rx.try_recv().is_err());
    }
}
