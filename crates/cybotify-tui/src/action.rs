//! Action enum — all user-initiated intents and internal events.

use crate::hover::HoverHandle;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    PlaylistIndex,
    TrackList,
    RadarPanel,
    LogPanel,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),
    OpenPlaylist(u64),
    CloseDetail,
    ReloadIndex,

    // ── Filter/search ────────────────────────────────────────────────────────
    OpenFilter,
    CloseFilter,
    FilterChanged(String),
    ClearFilter,

    // ── Sorting ──────────────────────────────────────────────────────────────
    ToggleSort,
    /// Raw value from the command line; validated by the session.
    SetSort(String),

    // ── Hover ────────────────────────────────────────────────────────────────
    HoverEnter(HoverHandle),
    HoverLeave(HoverHandle),

    // ── Command line ─────────────────────────────────────────────────────────
    OpenCommand,
    CloseCommand,
    RunCommand(String),

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleLogs,
    ToggleHelp,
    CopyToClipboard(String),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Resize,
}
