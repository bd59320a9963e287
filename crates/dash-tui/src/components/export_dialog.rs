//! ExportDialog component — small modal choosing the CSV export scope.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId, ExportScope},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PANEL_BORDER_FOCUSED, C_PRIMARY, C_SECONDARY},
};

pub struct ExportDialog {
    pub visible: bool,
}

impl ExportDialog {
    pub fn new() -> Self {
        Self { visible: false }
    }
}

impl Component for ExportDialog {
    fn id(&self) -> ComponentId {
        ComponentId::ExportDialog
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.visible {
            return vec![];
        }
        if state.export_in_flight {
            // An export is already running; only allow closing.
            return match key.code {
                KeyCode::Esc | KeyCode::Char('q') => vec![Action::CloseExportDialog],
                _ => vec![],
            };
        }
        match key.code {
            KeyCode::Char('c') | KeyCode::Enter => {
                vec![Action::Export(ExportScope::CurrentPage)]
            }
            KeyCode::Char('a') => vec![Action::Export(ExportScope::AllSongs)],
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('x') => {
                vec![Action::CloseExportDialog]
            }
            // Modal: swallow everything else
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, _event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            Action::OpenExportDialog => self.visible = true,
            Action::CloseExportDialog | Action::Export(_) => self.visible = false,
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if !self.visible {
            return;
        }

        let popup = centered_rect(46, 9, area);

        let lines: Vec<Line> = vec![
            Line::from(Span::styled(
                " export songs to CSV",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            option_row("c", "current page"),
            option_row("a", "all matching songs (every page)"),
            Line::from(""),
            Line::from(Span::styled(
                format!(" → {}", state.export_dir.display()),
                Style::default().fg(C_MUTED),
            )),
            Line::from(Span::styled(" esc cancels", Style::default().fg(C_MUTED))),
        ];

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(C_PANEL_BORDER_FOCUSED))
                    .style(Style::default().bg(ratatui::style::Color::Rgb(18, 18, 26))),
            ),
            popup,
        );
    }
}

fn option_row<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("   "),
        Span::styled(
            format!("{:<4}", key),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc, Style::default().fg(C_SECONDARY)),
    ])
}

fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vert[1])[1]
}
