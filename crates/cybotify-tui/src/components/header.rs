//! Header component — 2-row top bar.
//!
//! Row 1: app name, current view title, feed address.
//! Row 2: index summary, or stage progress and transport state of the open
//! detail session.
//!
//! Not focusable; draws to a 2-row area.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use cybotify_proto::protocol::StageKind;

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, DetailState, Screen, TransportStatus},
    component::Component,
    theme::{
        C_ACCENT, C_BADGE_ERR, C_BADGE_LIVE, C_BADGE_PENDING, C_MUTED, C_PRIMARY, C_SECONDARY,
        C_STATUS,
    },
};

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }
}

impl Component for Header {
    fn id(&self) -> ComponentId {
        ComponentId::PlaylistIndex
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        frame.render_widget(Clear, area);
        if area.height < 2 {
            frame.render_widget(Paragraph::new(build_row1(state)), area);
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        frame.render_widget(Paragraph::new(build_row1(state)), rows[0]);
        let row2 = match (&state.detail, state.screen) {
            (Some(detail), Screen::Detail) => build_detail_row(detail),
            _ => build_index_row(state),
        };
        frame.render_widget(Paragraph::new(row2), rows[1]);
    }
}

fn build_row1(state: &AppState) -> Line<'static> {
    let title = match (&state.detail, state.screen) {
        (Some(detail), Screen::Detail) => detail
            .session
            .title_sink()
            .title
            .clone()
            .unwrap_or_else(|| format!("playlist {}", detail.session.playlist().id)),
        _ => "playlists".to_string(),
    };

    Line::from(vec![
        Span::styled(
            " cybotify ",
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("· ", Style::default().fg(C_MUTED)),
        Span::styled(
            title,
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", state.base_url),
            Style::default().fg(C_MUTED),
        ),
    ])
}

fn build_index_row(state: &AppState) -> Line<'static> {
    let text = if state.index_loading {
        " loading playlists…".to_string()
    } else if let Some(err) = &state.index_error {
        format!(" feed error: {}", err)
    } else {
        format!(" {} playlists", state.playlists.len())
    };
    let color = if state.index_error.is_some() {
        C_BADGE_ERR
    } else {
        C_SECONDARY
    };
    Line::from(Span::styled(text, Style::default().fg(color)))
}

fn build_detail_row(detail: &DetailState) -> Line<'static> {
    let progress = detail.session.progress();
    let mut spans = vec![Span::raw(" ")];
    for kind in [StageKind::Name, StageKind::Tracks, StageKind::Features] {
        let (mark, color) = if progress.has(kind) {
            ("●", C_BADGE_LIVE)
        } else {
            ("○", C_MUTED)
        };
        spans.push(Span::styled(format!("{} ", mark), Style::default().fg(color)));
        spans.push(Span::styled(
            format!("{}  ", kind.label()),
            Style::default().fg(C_SECONDARY),
        ));
    }

    let status_color = match detail.transport {
        TransportStatus::Waiting => C_BADGE_PENDING,
        TransportStatus::Receiving => C_STATUS,
        TransportStatus::Done => C_BADGE_LIVE,
        TransportStatus::Failed(_) => C_BADGE_ERR,
    };
    spans.push(Span::styled(
        format!("{} {}", detail.driver.label(), detail.transport.label()),
        Style::default().fg(status_color),
    ));

    let stream = detail.session.stream();
    if stream.received() > 0 {
        spans.push(Span::styled(
            format!("  {} frames", stream.received()),
            Style::default().fg(C_MUTED),
        ));
    }
    if stream.dropped() > 0 {
        spans.push(Span::styled(
            format!(" ({} dropped)", stream.dropped()),
            Style::default().fg(C_BADGE_ERR),
        ));
    }
    if let TransportStatus::Failed(reason) = &detail.transport {
        spans.push(Span::styled(
            format!("  {}", reason),
            Style::default().fg(C_BADGE_ERR),
        ));
    }
    Line::from(spans)
}
