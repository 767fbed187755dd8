mod action;
mod app;
mod app_state;
mod command;
mod component;
mod components;
mod console;
mod error;
mod focus;
mod hover;
mod list_view;
mod radar;
mod search;
mod session;
mod stage;
mod surface;
mod theme;
mod transport;
mod widgets;

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cybotify_proto::config::Config;

use crate::session::SessionOptions;
use crate::transport::{DriverChoice, FeedClient};

/// Terminal client for the cybotify playlist feed.
#[derive(Debug, Parser)]
#[command(name = "cybotify", version)]
struct Args {
    /// Feed base URL, e.g. http://127.0.0.1:8742
    #[arg(long, env = "CYBOTIFY_BASE_URL")]
    base_url: Option<String>,
    /// Open this playlist's detail view on start.
    #[arg(long)]
    playlist: Option<u64>,
    #[arg(long, value_enum, default_value_t = DriverChoice::Auto)]
    driver: DriverChoice,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data_dir = cybotify_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("tui.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep HTTP and socket internals quiet.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "debug,hyper_util=warn,reqwest=warn,hyper=warn,tungstenite=warn".to_string()
    });
    let (console_tx, console_rx) = broadcast::channel::<String>(256);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .with(console::ConsoleLayer::new(console_tx))
        .with(tracing_subscriber::EnvFilter::new(log_filter))
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("cybotify log: {}", log_path.display());

    tracing::info!("cybotify starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let mut config = Config::load().unwrap_or_default();
    if let Some(base_url) = args.base_url {
        config.feed.base_url = base_url;
    }

    let options = match SessionOptions::from_config(&config) {
        Ok(options) => options,
        Err(e) => {
            tracing::warn!("{}; using the default sort", e);
            SessionOptions {
                threshold: config.search.threshold,
                closed_loop: config.view.closed_loop,
                ..SessionOptions::default()
            }
        }
    };

    let client = FeedClient::new(&config.feed)?;
    tracing::info!("feed at {}", client.base_url());

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(client, options, args.driver, args.playlist);
    app.run(console_rx).await
}
