//! SearchInput — wraps tui-input for the title search bar.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_MUTED, C_SEARCH_BG, C_SEARCH_FG};

pub enum SearchAction {
    /// The text changed — the list refetches with the new filter.
    Changed(String),
    /// Enter — explicit submission, re-issues the current query.
    Submitted,
    /// Search closed without a filter.
    Cancelled,
    None,
}

pub struct SearchInput {
    input: Input,
    pub active: bool,
    placeholder: String,
}

impl SearchInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    /// Handle a key event. Returns what happened.
    ///
    /// Esc behaviour:
    ///   - With text: clear it and emit `Changed("")` (search stays open)
    ///   - Already empty: deactivate and emit `Cancelled`
    pub fn handle_key(&mut self, key: KeyEvent) -> SearchAction {
        match key.code {
            KeyCode::Esc => {
                if !self.input.value().is_empty() {
                    self.input = Input::default();
                    SearchAction::Changed(String::new())
                } else {
                    self.deactivate();
                    SearchAction::Cancelled
                }
            }
            KeyCode::Enter => {
                self.deactivate();
                SearchAction::Submitted
            }
            _ => {
                let before = self.input.value().to_string();
                self.input
                    .handle_event(&ratatui::crossterm::event::Event::Key(key));
                if self.input.value() != before {
                    SearchAction::Changed(self.input.value().to_string())
                } else {
                    SearchAction::None
                }
            }
        }
    }

    /// Render the search bar into `area`.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(4) as usize);
        let value = self.input.value();
        let display = if value.is_empty() {
            Span::styled(
                format!("/ {}", self.placeholder),
                Style::default().fg(C_MUTED),
            )
        } else {
            Span::styled(
                format!("/ {}", visible_tail(value, scroll)),
                Style::default().fg(C_SEARCH_FG),
            )
        };

        let paragraph =
            Paragraph::new(Line::from(vec![display])).style(Style::default().bg(C_SEARCH_BG));
        frame.render_widget(paragraph, area);

        if self.active && !value.is_empty() {
            let cursor_x = area.x + 2 + (self.input.visual_cursor() - scroll) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new("search by title…")
    }
}

/// Tail of `s` after skipping `width` display columns, always landing on a
/// char boundary. `visual_scroll` counts columns, not bytes, so byte-slicing
/// with it would split multibyte characters.
fn visible_tail(s: &str, width: usize) -> &str {
    if width == 0 {
        return s;
    }
    let mut skipped = 0;
    for (idx, ch) in s.char_indices() {
        if skipped >= width {
            return &s[idx..];
        }
        skipped += unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn visible_tail_lands_on_char_boundaries() {
        assert_eq!(visible_tail("aéé", 0), "aéé");
        assert_eq!(visible_tail("aéé", 1), "éé");
        assert_eq!(visible_tail("aéé", 2), "é");
        assert_eq!(visible_tail("aéé", 5), "");
        // Wide characters count as two columns.
        assert_eq!(visible_tail("日本", 2), "本");
    }

    #[test]
    fn draw_with_scrolled_multibyte_text_does_not_panic() {
        let mut input = SearchInput::default();
        input.activate();
        let _ = input.handle_key(key('a'));
        for _ in 0..29 {
            let _ = input.handle_key(key('é'));
        }
        // Narrow bar forces the input to scroll past the multibyte run.
        let mut terminal = Terminal::new(TestBackend::new(10, 1)).unwrap();
        terminal.draw(|f| input.draw(f, f.area())).unwrap();
    }
}
