//! PlaylistIndex component — the user's playlists with a status filter.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use tracing::debug;

use cybotify_proto::model::{PlaylistStatus, PlaylistSummary};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_ACCENT, C_BADGE_PENDING, C_FILTER_FG, C_MUTED, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    transport::page_url,
    widgets::{
        pane_chrome::{pane_chrome_borders, Badge},
        scrollable_list::ScrollableList,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(PlaylistStatus),
}

impl StatusFilter {
    const CYCLE: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Only(PlaylistStatus::Private),
        StatusFilter::Only(PlaylistStatus::Public),
        StatusFilter::Only(PlaylistStatus::Collaborative),
    ];

    fn position(self) -> usize {
        Self::CYCLE.iter().position(|&f| f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::CYCLE[(self.position() + 1) % Self::CYCLE.len()]
    }

    pub fn prev(self) -> Self {
        Self::CYCLE[(self.position() + Self::CYCLE.len() - 1) % Self::CYCLE.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Only(status) => status.label(),
        }
    }

    pub fn accepts(self, summary: &PlaylistSummary) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => summary.status == status,
        }
    }
}

pub struct PlaylistIndex {
    list: ScrollableList<PlaylistSummary>,
    status: StatusFilter,
    list_state: ListState,
    pub borders: Borders,
}

impl PlaylistIndex {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
            status: StatusFilter::All,
            list_state: ListState::default(),
            borders: Borders::ALL,
        }
    }

    pub fn sync_playlists(&mut self, state: &AppState) {
        self.list.set_items(state.playlists.clone());
        let status = self.status;
        self.list.retain_visible(|p| status.accepts(p));
    }

    /// Returns whether the visible set was recomputed. Picking the filter
    /// that is already active does nothing.
    pub fn set_status(&mut self, status: StatusFilter) -> bool {
        if status == self.status {
            debug!("status filter {} already active", status.label());
            return false;
        }
        self.status = status;
        self.list.retain_visible(|p| status.accepts(p));
        self.list.select_first();
        true
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusFilter {
        self.status
    }

    #[cfg(test)]
    pub fn visible_ids(&self) -> Vec<u64> {
        self.list
            .visible_indices
            .iter()
            .map(|&i| self.list.items[i].id)
            .collect()
    }

    fn render_item<'a>(summary: &'a PlaylistSummary, selected: bool) -> ListItem<'a> {
        let name_style = if selected {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_PRIMARY)
        };
        let mut spans = vec![
            Span::styled(if selected { "▶ " } else { "  " }, Style::default().fg(C_ACCENT)),
            Span::styled(summary.display_name(), name_style),
            Span::styled(
                format!(
                    "  last updated {}",
                    summary.last_updated.format("%Y-%m-%d %H:%M")
                ),
                Style::default().fg(C_MUTED),
            ),
            Span::styled(
                format!("  {}", summary.status.label()),
                Style::default().fg(C_SECONDARY),
            ),
        ];
        if summary.needs_update {
            spans.push(Span::styled("  ↻", Style::default().fg(C_BADGE_PENDING)));
        }
        let item = ListItem::new(Line::from(spans));
        if selected {
            item.style(Style::default().bg(C_SELECTION_BG))
        } else {
            item
        }
    }
}

impl Component for PlaylistIndex {
    fn id(&self) -> ComponentId {
        ComponentId::PlaylistIndex
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter => {
                if let Some(p) = self.list.selected_item() {
                    return vec![Action::OpenPlaylist(p.id)];
                }
            }
            KeyCode::Char('f') => {
                self.set_status(self.status.next());
            }
            KeyCode::Char('F') => {
                self.set_status(self.status.prev());
            }
            KeyCode::Char(c @ '0'..='3') => {
                let idx = c as usize - '0' as usize;
                self.set_status(StatusFilter::CYCLE[idx]);
            }
            KeyCode::Char('y') => {
                if let Some(p) = self.list.selected_item() {
                    return vec![Action::CopyToClipboard(page_url(&state.base_url, p))];
                }
            }
            KeyCode::Char('r') => return vec![Action::ReloadIndex],
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        if event.row <= area.y {
            return vec![];
        }
        let rel_row = (event.row - area.y - 1) as usize;
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                let already = self.list.row_at(rel_row) == Some(self.list.selected);
                if self.list.handle_click(rel_row) {
                    return vec![];
                }
                // Second click on the selected row opens it.
                if already {
                    if let Some(p) = self.list.selected_item() {
                        return vec![Action::OpenPlaylist(p.id)];
                    }
                }
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let count = format!("playlists ({}/{})", self.list.len(), self.list.total_len());
        let badge = Badge {
            text: self.status.label(),
            color: C_FILTER_FG,
        };
        let block = pane_chrome_borders(&count, focused, Some(badge), self.borders);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.list.is_empty() {
            let msg = if state.index_loading {
                "  loading playlists…"
            } else if state.playlists.is_empty() {
                "  no playlists"
            } else {
                "  no playlists with this status"
            };
            frame.render_widget(
                Paragraph::new(Span::styled(msg, Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        }

        let height = inner.height as usize;
        self.list.ensure_visible(height);
        let selected = self.list.selected;
        let items: Vec<ListItem> = self
            .list
            .visible_items(height)
            .into_iter()
            .map(|(row, p)| Self::render_item(p, row == selected))
            .collect();

        self.list_state
            .select(Some(selected.saturating_sub(self.list.scroll_offset)));
        frame.render_stateful_widget(List::new(items), inner, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ratatui::crossterm::event::KeyModifiers;

    fn summary(id: u64, name: &str, status: PlaylistStatus) -> PlaylistSummary {
        PlaylistSummary {
            id,
            name: name.to_string(),
            last_updated: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            status,
            url: format!("/playlists/{}", id),
            needs_update: false,
        }
    }

    fn state() -> AppState {
        let mut state = AppState::new("http://127.0.0.1:8742");
        state.playlists = vec![
            summary(1, "Road Trip", PlaylistStatus::Public),
            summary(2, "", PlaylistStatus::Private),
            summary(3, "Focus", PlaylistStatus::Public),
            summary(4, "Band Practice", PlaylistStatus::Collaborative),
        ];
        state
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_status_filter_cycles_through_all_states() {
        let state = state();
        let mut index = PlaylistIndex::new();
        index.sync_playlists(&state);
        assert_eq!(index.visible_ids(), vec![1, 2, 3, 4]);

        index.handle_key(key('f'), &state);
        assert_eq!(index.status(), StatusFilter::Only(PlaylistStatus::Private));
        assert_eq!(index.visible_ids(), vec![2]);

        index.handle_key(key('f'), &state);
        assert_eq!(index.visible_ids(), vec![1, 3]);

        index.handle_key(key('f'), &state);
        assert_eq!(index.visible_ids(), vec![4]);

        index.handle_key(key('f'), &state);
        assert_eq!(index.status(), StatusFilter::All);
        assert_eq!(index.visible_ids(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_selecting_active_filter_is_noop() {
        let state = state();
        let mut index = PlaylistIndex::new();
        index.sync_playlists(&state);
        assert!(index.set_status(StatusFilter::Only(PlaylistStatus::Public)));
        index.list.select_down(1);
        assert!(!index.set_status(StatusFilter::Only(PlaylistStatus::Public)));
        // Selection survives because nothing was recomputed.
        assert_eq!(index.list.selected_item().map(|p| p.id), Some(3));
    }

    #[test]
    fn test_enter_opens_and_y_copies_url() {
        let state = state();
        let mut index = PlaylistIndex::new();
        index.sync_playlists(&state);
        index.handle_key(key('2'), &state);
        index.handle_key(key('j'), &state);

        let open = index.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &state);
        assert!(matches!(open.as_slice(), [Action::OpenPlaylist(3)]));

        let copy = index.handle_key(key('y'), &state);
        match copy.as_slice() {
            [Action::CopyToClipboard(url)] => {
                assert_eq!(url, "http://127.0.0.1:8742/playlists/3")
            }
            other => panic!("unexpected actions: {:?}", other),
        }
    }
}
