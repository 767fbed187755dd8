//! Status bar — bottom line with the input mode and keybindings.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app_state::Screen;
use crate::theme::{C_MODE_COMMAND, C_MODE_FILTER, C_MODE_NORMAL, C_MUTED};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Filter,
    Command,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Filter => "FILTER",
            Self::Command => "COMMAND",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Filter => C_MODE_FILTER,
            Self::Command => C_MODE_COMMAND,
        }
    }
}

fn keys_for(mode: InputMode, screen: Screen) -> &'static str {
    match (mode, screen) {
        (InputMode::Normal, Screen::Index) => {
            " ↑↓/jk select  Enter open  f status filter  y copy url  r reload  L logs  ? help  q quit"
        }
        (InputMode::Normal, Screen::Detail) => {
            " ↑↓/jk hover  / filter  x clear  s sort  : command  Tab panes  Esc back  L logs  ? help  q quit"
        }
        (InputMode::Filter, _) => " type to filter  Enter keep  Esc clear+close  Tab next pane",
        (InputMode::Command, _) => " sort <key> | filter <text> | clear  Esc cancel  Enter execute",
    }
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, screen: Screen) {
    let label = match (mode, screen) {
        (InputMode::Normal, Screen::Index) => "INDEX",
        (InputMode::Normal, Screen::Detail) => "DETAIL",
        (other, _) => other.label(),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", label),
            Style::default()
                .fg(mode.color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys_for(mode, screen), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
