//! Status bar — bottom lines with API state, mode, and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{
    C_ACCENT, C_MODE_NORMAL, C_MODE_SEARCH, C_MUTED, C_OK, C_SECONDARY, C_SEPARATOR,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Search,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "SONGS",
            Self::Search => "SEARCH",
        }
    }

    pub fn color(self) -> ratatui::style::Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Search => C_MODE_SEARCH,
        }
    }
}

/// Draw the log bar: API health dot plus the last status line.
pub fn draw_log_bar(frame: &mut Frame, area: Rect, last_log: Option<&str>, api_ok: bool) {
    let conn_span = if api_ok {
        Span::styled("●", Style::default().fg(C_OK))
    } else {
        Span::styled("○", Style::default().fg(C_ACCENT))
    };

    let log_span = Span::styled(last_log.unwrap_or(""), Style::default().fg(C_SECONDARY));

    let line = Line::from(vec![conn_span, Span::raw(" "), log_span]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode) {
    let keys = match mode {
        InputMode::Normal => {
            " ↑↓/jk select  ←→/hl page  t/d/e/r sort  1-5 rate  / search  x export  y yank  Tab panes  L logs  ? help  q quit"
        }
        InputMode::Search => " type to search (fetches as you type)  Enter submit  Esc clear/close",
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default()
                .fg(mode.color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
