//! Transport drivers: how stage data gets from the feed to the session.
//!
//! Both drivers run as background tasks and report through a channel of
//! [`FeedEnvelope`]s tagged with the ticket of the session that started them,
//! so events from a session that has since been torn down can be recognised
//! and dropped.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use cybotify_proto::config::FeedConfig;
use cybotify_proto::model::PlaylistSummary;
use cybotify_proto::protocol::{AnalysisPayload, PlaylistPayload, Stage};

use crate::error::TransportError;

/// `--driver` on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DriverChoice {
    Fetch,
    Stream,
    #[default]
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// Two concurrent requests, adapted into three stages.
    Fetch,
    /// One socket, one stage per message.
    Stream,
}

impl Driver {
    /// `Auto` streams when the playlist is being re-analysed and fetches the
    /// stored result otherwise.
    pub fn choose(choice: DriverChoice, summary: Option<&PlaylistSummary>) -> Driver {
        match choice {
            DriverChoice::Fetch => Driver::Fetch,
            DriverChoice::Stream => Driver::Stream,
            DriverChoice::Auto => match summary {
                Some(s) if s.needs_update => Driver::Stream,
                _ => Driver::Fetch,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Stream => "stream",
        }
    }
}

#[derive(Debug)]
pub enum FeedEvent {
    /// An already classified stage (fetch driver).
    Stage(Stage),
    /// A raw text frame (stream driver), still to be classified.
    Frame(String),
    /// The server closed the stream.
    Closed,
    Failed(String),
}

#[derive(Debug)]
pub struct FeedEnvelope {
    pub ticket: u64,
    pub event: FeedEvent,
}

#[derive(Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    base_url: String,
    ws_base: String,
}

impl FeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ws_base: config.ws_base(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn index_url(&self) -> String {
        format!("{}/api/playlists", self.base_url)
    }

    pub fn playlist_url(&self, id: u64) -> String {
        format!("{}/api/playlists/{}", self.base_url, id)
    }

    pub fn analysis_url(&self, id: u64) -> String {
        format!("{}/api/playlists/{}/analysis", self.base_url, id)
    }

    pub fn detail_socket_url(&self, id: u64) -> String {
        format!("{}/ws/playlist_detail/{}/", self.ws_base, id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, TransportError> {
        debug!("GET {}", url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16(), url));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn fetch_index(&self) -> Result<Vec<PlaylistSummary>, TransportError> {
        self.get_json(self.index_url()).await
    }

    /// Both requests run concurrently and both must succeed.
    pub async fn fetch_detail(&self, id: u64) -> Result<[Stage; 3], TransportError> {
        let (playlist, analysis) = tokio::try_join!(
            self.get_json::<PlaylistPayload>(self.playlist_url(id)),
            self.get_json::<AnalysisPayload>(self.analysis_url(id)),
        )?;
        Ok(Stage::from_fetch(playlist, analysis))
    }
}

/// Absolute form of a playlist's navigation target.
pub fn page_url(base_url: &str, summary: &PlaylistSummary) -> String {
    if summary.url.starts_with("http://") || summary.url.starts_with("https://") {
        summary.url.clone()
    } else {
        format!("{}{}", base_url.trim_end_matches('/'), summary.url)
    }
}

/// Start `driver` for playlist `id`. Aborting the handle stops the driver.
pub fn spawn_driver(
    driver: Driver,
    client: FeedClient,
    id: u64,
    ticket: u64,
    tx: mpsc::Sender<FeedEnvelope>,
) -> JoinHandle<()> {
    info!("starting {} driver for playlist {}", driver.label(), id);
    match driver {
        Driver::Fetch => tokio::spawn(run_fetch(client, id, ticket, tx)),
        Driver::Stream => {
            let url = client.detail_socket_url(id);
            tokio::spawn(run_stream(url, ticket, tx))
        }
    }
}

async fn run_fetch(client: FeedClient, id: u64, ticket: u64, tx: mpsc::Sender<FeedEnvelope>) {
    match client.fetch_detail(id).await {
        Ok(stages) => {
            for stage in stages {
                let envelope = FeedEnvelope {
                    ticket,
                    event: FeedEvent::Stage(stage),
                };
                if tx.send(envelope).await.is_err() {
                    return;
                }
            }
        }
        Err(e) => {
            warn!("fetch for playlist {} failed: {}", id, e);
            let _ = tx
                .send(FeedEnvelope {
                    ticket,
                    event: FeedEvent::Failed(e.to_string()),
                })
                .await;
        }
    }
}

/// What to do with one socket read.
#[derive(Debug, PartialEq)]
enum SocketStep {
    Forward(String),
    Pong(Vec<u8>),
    Skip,
    End(Option<String>),
}

fn socket_step(msg: Result<Message, tokio_tungstenite::tungstenite::Error>) -> SocketStep {
    match msg {
        Ok(Message::Text(text)) => SocketStep::Forward(text.as_str().to_owned()),
        Ok(Message::Binary(data)) => {
            warn!("dropping binary frame ({} bytes)", data.len());
            SocketStep::Skip
        }
        Ok(Message::Ping(data)) => SocketStep::Pong(data.to_vec()),
        Ok(Message::Close(_)) => SocketStep::End(None),
        Ok(_) => SocketStep::Skip,
        Err(e) => SocketStep::End(Some(TransportError::from(e).to_string())),
    }
}

async fn run_stream(url: String, ticket: u64, tx: mpsc::Sender<FeedEnvelope>) {
    let send = |event: FeedEvent| {
        let tx = tx.clone();
        async move { tx.send(FeedEnvelope { ticket, event }).await.is_ok() }
    };

    let (ws_stream, _) = match connect_async(&url).await {
        Ok(pair) => pair,
        Err(e) => {
            let e = TransportError::from(e);
            warn!("could not open {}: {}", url, e);
            send(FeedEvent::Failed(e.to_string())).await;
            return;
        }
    };
    info!("stage stream connected: {}", url);

    let (mut write, mut read) = ws_stream.split();
    while let Some(msg) = read.next().await {
        match socket_step(msg) {
            SocketStep::Forward(text) => {
                if !send(FeedEvent::Frame(text)).await {
                    return;
                }
            }
            SocketStep::Pong(data) => {
                if let Err(e) = write.send(Message::Pong(data.into())).await {
                    warn!("failed to answer ping: {}", e);
                }
            }
            SocketStep::Skip => {}
            SocketStep::End(None) => break,
            SocketStep::End(Some(reason)) => {
                warn!("stage stream failed: {}", reason);
                send(FeedEvent::Failed(reason)).await;
                return;
            }
        }
    }
    info!("stage stream closed by server");
    send(FeedEvent::Closed).await;
}
