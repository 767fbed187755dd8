use thiserror::Error;

/// The search index was queried before any track data was indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("search index is not built yet")]
pub struct NotReadyError;

/// A UI control handed the list view a value it does not understand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown sort key {0:?} (expected \"default\" or \"alphabetical\")")]
    UnknownSortKey(String),
}

/// Failure talking to the feed. Surfaced to the orchestrator, never retried.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{1} answered HTTP {0}")]
    Status(u16, String),
    #[error("websocket: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("undecodable response: {0}")]
    Decode(#[from] serde_json::Error),
}
