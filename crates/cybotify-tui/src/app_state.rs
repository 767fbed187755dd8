//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use cybotify_proto::model::PlaylistSummary;

use crate::session::TerminalSession;
use crate::transport::Driver;
use crate::widgets::status_bar::InputMode;

/// Which top-level view is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Index,
    Detail,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportStatus {
    /// Driver started, nothing received yet.
    Waiting,
    /// Stages are arriving.
    Receiving,
    /// Every stage landed (fetch) or the server closed the stream.
    Done,
    Failed(String),
}

impl TransportStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::Waiting => "waiting",
            Self::Receiving => "receiving",
            Self::Done => "done",
            Self::Failed(_) => "failed",
        }
    }
}

/// The open playlist detail view.
pub struct DetailState {
    pub session: TerminalSession,
    pub driver: Driver,
    /// Ticket of the driver feeding this session.
    pub ticket: u64,
    pub transport: TransportStatus,
}

pub struct AppState {
    // ── Feed ────────────────────────────────────────────────────────────────
    pub base_url: String,
    pub playlists: Vec<PlaylistSummary>,
    pub index_loading: bool,
    pub index_error: Option<String>,

    // ── Detail ──────────────────────────────────────────────────────────────
    pub detail: Option<DetailState>,

    // ── UI mode ─────────────────────────────────────────────────────────────
    pub screen: Screen,
    pub input_mode: InputMode,

    /// WARN/ERROR lines forwarded from the tracing subscriber.
    pub logs: Vec<String>,
}

impl AppState {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            playlists: Vec::new(),
            index_loading: false,
            index_error: None,
            detail: None,
            screen: Screen::Index,
            input_mode: InputMode::Normal,
            logs: Vec::new(),
        }
    }

    pub fn session(&self) -> Option<&TerminalSession> {
        self.detail.as_ref().map(|d| &d.session)
    }

    pub fn summary(&self, id: u64) -> Option<&PlaylistSummary> {
        self.playlists.iter().find(|p| p.id == id)
    }
}
