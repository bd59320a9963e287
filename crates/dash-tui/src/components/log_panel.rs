//! LogPanel component — collapsible viewer over the TUI log file tail.
//!
//! Handles its own scroll state; the App refreshes `tui_log_lines` while
//! the panel is expanded.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::C_MUTED,
    widgets::pane_chrome::pane_chrome,
};

pub struct LogPanel {
    pub expanded: bool,
    pub scroll: usize,
    /// Track last log count to detect new entries for auto-scroll
    last_log_count: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            expanded: false,
            scroll: 0,
            last_log_count: 0,
        }
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
        if self.expanded {
            // Jump to bottom on open
            self.scroll = usize::MAX;
        }
    }
}

impl Component for LogPanel {
    fn id(&self) -> ComponentId {
        ComponentId::LogPanel
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if !self.expanded {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll += 1;
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
            }
            KeyCode::PageDown => {
                self.scroll += 10;
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.scroll = 0;
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.scroll = usize::MAX;
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        if !self.expanded {
            return vec![];
        }
        match event.kind {
            MouseEventKind::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            MouseEventKind::ScrollDown => {
                self.scroll += 1;
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            Action::ToggleLogs => {
                self.toggle();
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        if !self.expanded || area.height == 0 {
            return;
        }
        frame.render_widget(Clear, area);

        let block = pane_chrome("Log", focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let logs = &state.tui_log_lines;
        let height = inner.height as usize;
        let log_count = logs.len();

        // Auto-scroll to bottom if new logs arrived and we were at bottom
        if log_count > self.last_log_count {
            let max_scroll = log_count.saturating_sub(height);
            if self.scroll >= max_scroll.saturating_sub(1) {
                self.scroll = usize::MAX;
            }
            self.last_log_count = log_count;
        }

        if logs.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  no log entries yet",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        // Clamp scroll — newest last (scroll 0 = top = oldest)
        let max_scroll = log_count.saturating_sub(height);
        if self.scroll > max_scroll {
            self.scroll = max_scroll;
        }

        let lines: Vec<Line> = logs
            .iter()
            .skip(self.scroll)
            .take(height)
            .map(|msg| {
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(compact_log_line(msg), Style::default().fg(C_MUTED)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

// ── Log line formatting ───────────────────────────────────────────────────────

pub fn compact_log_line(raw: &str) -> String {
    let clean = strip_ansi(raw).trim().to_string();
    let mut rest = clean.as_str();
    let mut head: Vec<String> = Vec::new();

    // Try to shrink a leading RFC3339 timestamp to its time-of-day part
    if let Some((tok, rem)) = split_first_token(rest) {
        if let Some(ts) = compact_timestamp(tok) {
            head.push(ts);
            rest = rem.trim_start();
        }
    }

    // Try to strip a log level
    if let Some((tok, rem)) = split_first_token(rest) {
        let upper = tok.to_ascii_uppercase();
        if matches!(
            upper.as_str(),
            "TRACE" | "DEBUG" | "INFO" | "WARN" | "ERROR"
        ) {
            head.push(upper);
            rest = rem.trim_start();
        }
    }

    // Strip a module path prefix like "foo::bar: "
    if let Some((left, msg)) = rest.split_once(": ") {
        if !left.is_empty()
            && left.len() <= 48
            && left
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-'))
        {
            rest = msg.trim_start();
        }
    }

    if head.is_empty() {
        rest.to_string()
    } else if rest.is_empty() {
        head.join(" ")
    } else {
        format!("{} {}", head.join(" "), rest)
    }
}

/// "2026-08-24T10:31:02.123456Z" → "10:31:02". Accepts only tokens that look
/// like RFC3339 timestamps.
fn compact_timestamp(token: &str) -> Option<String> {
    let bytes = token.as_bytes();
    if bytes.len() < 19 || bytes[4] != b'-' || bytes[7] != b'-' || bytes[10] != b'T' {
        return None;
    }
    token.get(11..19).map(|t| t.to_string())
}

fn split_first_token(s: &str) -> Option<(&str, &str)> {
    let mut parts = s.splitn(2, char::is_whitespace);
    let first = parts.next()?.trim();
    if first.is_empty() {
        return None;
    }
    Some((first, parts.next().unwrap_or("")))
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_escape = false;
    for ch in s.chars() {
        if in_escape {
            if ('@'..='~').contains(&ch) {
                in_escape = false;
            }
            continue;
        }
        if ch == '\u{1b}' {
            in_escape = true;
            continue;
        }
        out.push(ch);
    }
    out
}
