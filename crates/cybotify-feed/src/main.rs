mod library;
mod server;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use cybotify_proto::config::Config;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Development feed: serves a playlist library over HTTP and a staged WebSocket.
#[derive(Debug, Parser)]
#[command(name = "cybotify-feed", version)]
struct Args {
    /// JSON library file (seeded with demo data when missing).
    #[arg(long, env = "CYBOTIFY_LIBRARY")]
    library: Option<std::path::PathBuf>,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    bind: Option<String>,
    /// Pause between WebSocket stages, in milliseconds.
    #[arg(long)]
    stage_delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,cybotify_feed=debug")),
        )
        .init();

    let config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());

    let server = config.server;
    let library_path = args.library.unwrap_or(server.library);
    let library = library::Library::load(&library_path)?;

    let state = server::FeedState {
        library: Arc::new(library),
        stage_delay: Duration::from_millis(args.stage_delay_ms.unwrap_or(server.stage_delay_ms)),
    };

    server::serve(
        args.bind.unwrap_or(server.bind_address),
        args.port.unwrap_or(server.port),
        state,
    )
    .await
}
