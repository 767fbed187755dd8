//! TrackList component — the filtered, sorted rows of the open playlist.
//!
//! The rows themselves come from the session; this component only owns the
//! cursor, the filter bar and which row is currently hovered. Moving the
//! cursor or the mouse onto a row leaves the previous row first.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    hover::HoverHandle,
    list_view::RenderedRow,
    theme::{C_ARTIST, C_FILTER_FG, C_MUTED, C_PRIMARY, C_RADAR_OVERLAY, C_SELECTION_BG},
    widgets::{
        filter_input::{FilterAction, FilterInput},
        pane_chrome::{pane_chrome_borders, Badge},
        scrollable_list::ScrollableList,
    },
};

pub struct TrackList {
    list: ScrollableList<RenderedRow>,
    filter_input: FilterInput,
    hovered: Option<HoverHandle>,
    list_state: ListState,
    pub borders: Borders,
}

impl TrackList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
            filter_input: FilterInput::new('/', "filter tracks..."),
            hovered: None,
            list_state: ListState::default(),
            borders: Borders::ALL,
        }
    }

    /// Pick up a new projection from the session. When the session rebound
    /// its rows under an active hover, the hover moves to the selected row.
    pub fn sync_rows(&mut self, state: &AppState) -> Vec<Action> {
        self.refresh_items(state);
        let Some(old) = self.hovered else {
            return vec![];
        };
        let live = state.session().and_then(|s| s.hover_handle(old.row()));
        if live == Some(old) {
            return vec![];
        }
        // The old handle is stale; a leave for it would be ignored.
        self.hovered = None;
        self.hover_selected(state)
    }

    fn refresh_items(&mut self, state: &AppState) {
        let rows = state.session().map(|s| s.rows()).unwrap_or(&[]);
        if self.list.items.as_slice() != rows {
            self.list.set_items(rows.to_vec());
        }
    }

    pub fn reset(&mut self) {
        self.list = ScrollableList::new();
        self.filter_input.clear();
        self.filter_input.deactivate();
        self.hovered = None;
    }

    #[cfg(test)]
    pub fn is_filter_active(&self) -> bool {
        self.filter_input.is_active()
    }

    #[cfg(test)]
    pub fn hovered(&self) -> Option<HoverHandle> {
        self.hovered
    }

    /// Move the hover to `row` (or off every row). Emits a leave for the old
    /// row before the enter for the new one.
    fn hover_to(&mut self, row: Option<usize>, state: &AppState) -> Vec<Action> {
        let next = match (row, state.session()) {
            (Some(row), Some(session)) => session.hover_handle(row),
            _ => None,
        };
        if next == self.hovered {
            return vec![];
        }
        let mut out = Vec::new();
        if let Some(old) = self.hovered.take() {
            out.push(Action::HoverLeave(old));
        }
        if let Some(handle) = next {
            out.push(Action::HoverEnter(handle));
            self.hovered = Some(handle);
        }
        out
    }

    /// Pointer went somewhere other than this list.
    pub fn leave(&mut self, state: &AppState) -> Vec<Action> {
        self.hover_to(None, state)
    }

    fn hover_selected(&mut self, state: &AppState) -> Vec<Action> {
        let row = (!self.list.is_empty()).then_some(self.list.selected);
        self.hover_to(row, state)
    }

    fn key_actions(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if self.filter_input.is_active() {
            match key.code {
                KeyCode::Up => {
                    self.list.select_up(1);
                    return self.hover_selected(state);
                }
                KeyCode::Down => {
                    self.list.select_down(1);
                    return self.hover_selected(state);
                }
                _ => {}
            }
            return match self.filter_input.handle_key(key) {
                FilterAction::Changed(q) => vec![Action::FilterChanged(q)],
                FilterAction::Confirmed(_) | FilterAction::Cancelled => vec![Action::CloseFilter],
                FilterAction::None => vec![],
            };
        }

        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            5
        } else {
            1
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(step),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Char('/') => {
                self.filter_input.activate();
                return vec![Action::OpenFilter];
            }
            KeyCode::Char('x') => return vec![Action::ClearFilter],
            KeyCode::Char('s') => return vec![Action::ToggleSort],
            KeyCode::Char(':') => return vec![Action::OpenCommand],
            KeyCode::Char('y') => {
                if let Some(row) = self.list.selected_item() {
                    return vec![Action::CopyToClipboard(format!(
                        "{} - {}",
                        row.name, row.artists
                    ))];
                }
                return vec![];
            }
            KeyCode::Esc | KeyCode::Backspace => return vec![Action::CloseDetail],
            _ => return vec![],
        }
        self.hover_selected(state)
    }

    fn mouse_actions(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        let inside_rows = event.row > area.y && event.row < area.y + area.height.saturating_sub(1);
        let rel_row = event.row.saturating_sub(area.y + 1) as usize;
        match event.kind {
            MouseEventKind::Moved => {
                let row = if inside_rows {
                    self.list.row_at(rel_row)
                } else {
                    None
                };
                self.hover_to(row, state)
            }
            MouseEventKind::ScrollUp => {
                self.list.select_up(1);
                self.hover_selected(state)
            }
            MouseEventKind::ScrollDown => {
                self.list.select_down(1);
                self.hover_selected(state)
            }
            MouseEventKind::Down(MouseButton::Left) if inside_rows => {
                self.list.handle_click(rel_row);
                self.hover_selected(state)
            }
            _ => vec![],
        }
    }

    fn render_item<'a>(row: &'a RenderedRow, selected: bool, bound: bool) -> ListItem<'a> {
        let marker = if bound { "◆ " } else { "  " };
        let name_style = if selected {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_PRIMARY)
        };
        let item = ListItem::new(Line::from(vec![
            Span::styled(marker, Style::default().fg(C_RADAR_OVERLAY)),
            Span::styled(row.name.as_str(), name_style),
            Span::styled("  ", Style::default()),
            Span::styled(row.artists.as_str(), Style::default().fg(C_ARTIST)),
        ]));
        if selected {
            item.style(Style::default().bg(C_SELECTION_BG))
        } else {
            item
        }
    }
}

impl Component for TrackList {
    fn id(&self) -> ComponentId {
        ComponentId::TrackList
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let mut out = self.sync_rows(state);
        out.extend(self.key_actions(key, state));
        out
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        let mut out = self.sync_rows(state);
        out.extend(self.mouse_actions(event, area, state));
        out
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            // From the command line: keep the bar in step with the session.
            Action::FilterChanged(q) => {
                if self.filter_input.text() != q {
                    self.filter_input.set_value(q);
                }
            }
            Action::ClearFilter => {
                self.filter_input.clear();
                self.filter_input.deactivate();
            }
            Action::CloseFilter => self.filter_input.deactivate(),
            Action::CloseDetail | Action::OpenPlaylist(_) => self.reset(),
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        self.refresh_items(state);
        let Some(session) = state.session() else {
            return;
        };

        let title = format!("tracks ({}/{})", self.list.len(), session.playlist().tracks.len());
        let badge = Badge {
            text: session.view().sort.label(),
            color: C_FILTER_FG,
        };
        let block = pane_chrome_borders(&title, focused, Some(badge), self.borders);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let filter = &session.view().filter;
        let show_bar = self.filter_input.is_active() || !filter.is_empty();
        let list_height = if show_bar {
            inner.height.saturating_sub(1)
        } else {
            inner.height
        };
        let list_area = Rect {
            height: list_height,
            ..inner
        };

        if self.list.is_empty() {
            let msg = if !session.progress().has(cybotify_proto::protocol::StageKind::Tracks) {
                "  waiting for tracks…"
            } else if !filter.is_empty() {
                "  no tracks match filter"
            } else {
                "  playlist is empty"
            };
            frame.render_widget(
                Paragraph::new(Span::styled(msg, Style::default().fg(C_MUTED))),
                list_area,
            );
        } else {
            let height = list_area.height as usize;
            self.list.ensure_visible(height);
            let selected = self.list.selected;
            let items: Vec<ListItem> = self
                .list
                .visible_items(height)
                .into_iter()
                .map(|(row, r)| {
                    Self::render_item(r, row == selected, session.hover_handle(row).is_some())
                })
                .collect();
            self.list_state
                .select(Some(selected.saturating_sub(self.list.scroll_offset)));
            frame.render_stateful_widget(List::new(items), list_area, &mut self.list_state);
        }

        if show_bar {
            let bar = Rect {
                y: inner.y + inner.height.saturating_sub(1),
                height: 1,
                ..inner
            };
            if self.filter_input.is_active() {
                self.filter_input.draw(frame, bar);
            } else {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        format!("/ {}", filter),
                        Style::default().fg(C_FILTER_FG),
                    )),
                    bar,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::{DetailState, Screen, TransportStatus};
    use crate::session::{SessionOptions, TerminalSession};
    use crate::surface::{ChartBuffer, RowBuffer, TitleBuffer};
    use crate::transport::Driver;
    use cybotify_proto::model::{FeatureVector, Track, TrackId};
    use cybotify_proto::protocol::{Stage, TrackFeatures};

    fn vector(v: f64) -> FeatureVector {
        FeatureVector::from_values([v; 7]).unwrap()
    }

    fn state_with(features_for: &[u64]) -> AppState {
        let mut session = TerminalSession::new(
            9,
            ChartBuffer::default(),
            RowBuffer::default(),
            TitleBuffer::default(),
            &SessionOptions::default(),
        );
        session.start();
        session.apply_stage(Stage::Tracks(vec![
            Track::new(1u64, "Song A", &["X"]),
            Track::new(2u64, "Song B", &["Y"]),
            Track::new(3u64, "Song C", &["Z"]),
        ]));
        session.apply_stage(Stage::Features {
            aggregate: vector(0.5),
            per_track: features_for
                .iter()
                .map(|id| TrackFeatures {
                    id: TrackId::from(*id),
                    features: vector(0.1),
                })
                .collect(),
        });
        let mut state = AppState::new("http://127.0.0.1:8742");
        state.screen = Screen::Detail;
        state.detail = Some(DetailState {
            session,
            driver: Driver::Fetch,
            ticket: 1,
            transport: TransportStatus::Done,
        });
        state
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn moved(row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Moved,
            column: 4,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 40,
        height: 10,
    };

    #[test]
    fn test_cursor_leaves_old_row_before_entering_new() {
        let state = state_with(&[1, 2, 3]);
        let mut list = TrackList::new();

        // Cursor starts on row 0; moving down enters row 1.
        let first = list.handle_key(key(KeyCode::Down), &state);
        assert!(matches!(first.as_slice(), [Action::HoverEnter(h)] if h.row() == 1));

        let second = list.handle_key(key(KeyCode::Down), &state);
        match second.as_slice() {
            [Action::HoverLeave(old), Action::HoverEnter(new)] => {
                assert_eq!(old.row(), 1);
                assert_eq!(new.row(), 2);
            }
            other => panic!("unexpected actions: {:?}", other),
        }
    }

    #[test]
    fn test_rows_without_features_have_no_hover() {
        let state = state_with(&[1]);
        let mut list = TrackList::new();
        assert!(list.handle_mouse(moved(1), AREA, &state).iter().any(
            |a| matches!(a, Action::HoverEnter(h) if h.row() == 0)
        ));
        // Row 1 has no vector: only the leave is emitted.
        let actions = list.handle_mouse(moved(2), AREA, &state);
        assert!(matches!(actions.as_slice(), [Action::HoverLeave(h)] if h.row() == 0));
        assert!(list.hovered().is_none());
    }

    #[test]
    fn test_mouse_off_the_rows_leaves() {
        let state = state_with(&[1, 2, 3]);
        let mut list = TrackList::new();
        list.handle_mouse(moved(3), AREA, &state);
        assert_eq!(list.hovered().map(|h| h.row()), Some(2));
        let actions = list.handle_mouse(moved(0), AREA, &state);
        assert!(matches!(actions.as_slice(), [Action::HoverLeave(_)]));
        // Same position again: nothing new to report.
        assert!(list.handle_mouse(moved(0), AREA, &state).is_empty());
    }

    #[test]
    fn test_rebinding_rehovers_the_selected_row() {
        let mut state = state_with(&[1, 2, 3]);
        let mut list = TrackList::new();
        list.handle_key(key(KeyCode::Down), &state);
        let old = list.hovered().unwrap();

        let session = &mut state.detail.as_mut().unwrap().session;
        session.set_sort_key(crate::list_view::SortKey::Alphabetical);
        let live = session.hover_handle(1).unwrap();
        assert_ne!(live, old);

        let actions = list.sync_rows(&state);
        assert!(matches!(actions.as_slice(), [Action::HoverEnter(h)] if *h == live));
        assert_eq!(list.hovered(), Some(live));
        // Nothing changed since: no repeat.
        assert!(list.sync_rows(&state).is_empty());
    }

    #[test]
    fn test_rebinding_to_no_rows_drops_the_hover() {
        let mut state = state_with(&[1, 2, 3]);
        let mut list = TrackList::new();
        list.handle_key(key(KeyCode::Down), &state);
        assert!(list.hovered().is_some());

        state.detail.as_mut().unwrap().session.set_filter("qqqqqqqqqqqq");
        assert!(list.sync_rows(&state).is_empty());
        assert!(list.hovered().is_none());
    }

    #[test]
    fn test_filter_keys_emit_filter_actions() {
        let state = state_with(&[]);
        let mut list = TrackList::new();
        assert!(matches!(
            list.handle_key(key(KeyCode::Char('/')), &state).as_slice(),
            [Action::OpenFilter]
        ));
        assert!(list.is_filter_active());
        assert!(matches!(
            list.handle_key(key(KeyCode::Char('b')), &state).as_slice(),
            [Action::FilterChanged(q)] if q == "b"
        ));
        assert!(matches!(
            list.handle_key(key(KeyCode::Enter), &state).as_slice(),
            [Action::CloseFilter]
        ));
        assert!(matches!(
            list.handle_key(key(KeyCode::Char('x')), &state).as_slice(),
            [Action::ClearFilter]
        ));
        assert!(matches!(
            list.handle_key(key(KeyCode::Esc), &state).as_slice(),
            [Action::CloseDetail]
        ));
    }
}
