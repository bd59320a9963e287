//! SongTable component — the paged, sortable, searchable song list.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use dash_api::model::{Song, SortKey};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_secondary, style_selected, style_selected_focused, C_ACCENT, C_MUTED, C_PRIMARY,
        C_SECONDARY, C_STARS, C_STARS_EMPTY,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        search_input::{SearchAction, SearchInput},
    },
};

/// Width of each numeric column; the title column takes the rest.
const NUM_COL_WIDTH: u16 = 14;

/// Sortable columns, in header order.
const COLUMNS: [SortKey; 4] = [
    SortKey::Title,
    SortKey::Danceability,
    SortKey::Energy,
    SortKey::Rating,
];

pub struct SongTable {
    pub search: SearchInput,
    table_state: TableState,
    selected: usize,
    // Last-drawn geometry, for mouse hit-testing.
    header_y: u16,
    rows_y: u16,
    inner: Rect,
    search_visible: bool,
}

impl SongTable {
    pub fn new() -> Self {
        Self {
            search: SearchInput::default(),
            table_state: TableState::default(),
            selected: 0,
            header_y: 0,
            rows_y: 0,
            inner: Rect::default(),
            search_visible: false,
        }
    }

    pub fn selected_song<'a>(&self, state: &'a AppState) -> Option<&'a Song> {
        state.songs.get(self.selected)
    }

    fn clamp_selection(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Column under column `x`, accounting for the one-cell spacing the table
    /// renders between columns. Clicks on a spacer hit nothing.
    fn column_at(&self, x: u16) -> Option<SortKey> {
        if x < self.inner.x || x >= self.inner.x + self.inner.width {
            return None;
        }
        let title_w = self.inner.width.saturating_sub((NUM_COL_WIDTH + 1) * 3);
        let rel = x - self.inner.x;
        let mut start = 0;
        for (idx, width) in [title_w, NUM_COL_WIDTH, NUM_COL_WIDTH, NUM_COL_WIDTH]
            .into_iter()
            .enumerate()
        {
            if rel >= start && rel < start + width {
                return COLUMNS.get(idx).copied();
            }
            start += width + 1;
        }
        None
    }

    fn handle_normal_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !state.songs.is_empty() {
                    self.selected = (self.selected + 1).min(state.songs.len() - 1);
                }
                vec![]
            }
            KeyCode::Left | KeyCode::Char('h') => vec![Action::PrevPage],
            KeyCode::Right | KeyCode::Char('l') => vec![Action::NextPage],
            KeyCode::Char('t') => vec![Action::Sort(SortKey::Title)],
            KeyCode::Char('d') => vec![Action::Sort(SortKey::Danceability)],
            KeyCode::Char('e') => vec![Action::Sort(SortKey::Energy)],
            KeyCode::Char('r') => vec![Action::Sort(SortKey::Rating)],
            KeyCode::Char('/') => {
                self.search.activate();
                vec![Action::Noop]
            }
            KeyCode::Char(c @ '1'..='5') => {
                let score = c as u8 - b'0';
                match self.selected_song(state) {
                    Some(song) => vec![Action::Rate(song.id, score)],
                    None => vec![],
                }
            }
            KeyCode::Char('y') => match self.selected_song(state) {
                Some(song) => vec![Action::CopyToClipboard(song.title.clone())],
                None => vec![],
            },
            KeyCode::Char('x') => vec![Action::OpenExportDialog],
            _ => vec![],
        }
    }
}

impl Component for SongTable {
    fn id(&self) -> ComponentId {
        ComponentId::SongTable
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if self.search.is_active() {
            return match self.search.handle_key(key) {
                SearchAction::Changed(text) => vec![Action::SearchChanged(text)],
                SearchAction::Submitted => vec![Action::SearchSubmitted],
                SearchAction::Cancelled => vec![Action::Noop],
                SearchAction::None => vec![],
            };
        }
        self.handle_normal_key(key, state)
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let (x, y) = (event.column, event.row);
                if y == self.header_y {
                    if let Some(key) = self.column_at(x) {
                        return vec![Action::Sort(key)];
                    }
                } else if y >= self.rows_y {
                    let row = (y - self.rows_y) as usize;
                    if row < state.songs.len() {
                        self.selected = row;
                    }
                }
                vec![]
            }
            MouseEventKind::ScrollUp => {
                self.selected = self.selected.saturating_sub(1);
                vec![]
            }
            MouseEventKind::ScrollDown => {
                if !state.songs.is_empty() {
                    self.selected = (self.selected + 1).min(state.songs.len() - 1);
                }
                vec![]
            }
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        // A refetch replaced the list — keep the selection in bounds.
        match action {
            Action::NextPage
            | Action::PrevPage
            | Action::Sort(_)
            | Action::SearchChanged(_)
            | Action::SearchSubmitted => {
                self.clamp_selection(state.songs.len());
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        self.clamp_selection(state.songs.len());

        let badge = state.error.as_ref().map(|_| Badge {
            text: "ERR",
            color: C_ACCENT,
        });
        let block = pane_chrome("Songs", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.inner = inner;

        let mut y = inner.y;

        // Search bar: shown while active or non-empty.
        self.search_visible = self.search.is_active() || !self.search.is_empty();
        if self.search_visible && inner.height > 0 {
            let bar = Rect {
                x: inner.x,
                y,
                width: inner.width,
                height: 1,
            };
            self.search.draw(frame, bar);
            y += 1;
        }

        let body = Rect {
            x: inner.x,
            y,
            width: inner.width,
            height: inner.height.saturating_sub(y - inner.y),
        };
        if body.height < 2 {
            return;
        }

        if state.no_results {
            self.header_y = 0;
            self.rows_y = 0;
            let message = if state.error.is_some() {
                "Request failed. Check the API and try again."
            } else {
                "No results found. Please try another search."
            };
            let mut lines = vec![Line::from(Span::styled(message, style_secondary()))];
            if let Some(err) = &state.error {
                lines.push(Line::from(Span::styled(
                    err.clone(),
                    Style::default().fg(C_MUTED),
                )));
            }
            frame.render_widget(Paragraph::new(lines).centered(), body);
            return;
        }

        self.header_y = body.y;
        self.rows_y = body.y + 1;

        let header = Row::new(COLUMNS.map(|key| {
            let mut label = key.label().to_string();
            if state.query.sort_key == key {
                label = format!("{} {}", label, state.query.direction.arrow());
            }
            let style = if state.query.sort_key == key {
                Style::default().fg(C_PRIMARY)
            } else {
                Style::default().fg(C_SECONDARY)
            };
            Cell::from(Span::styled(label, style))
        }));

        let title_width = body.width.saturating_sub((NUM_COL_WIDTH + 1) * 3) as usize;
        let rows: Vec<Row> = state
            .songs
            .iter()
            .map(|song| {
                Row::new(vec![
                    Cell::from(truncate(&song.title, title_width)),
                    Cell::from(format!("{:.3}", song.danceability)),
                    Cell::from(format!("{:.3}", song.energy)),
                    Cell::from(stars_line(song.rating)),
                ])
            })
            .collect();

        let widths = [
            Constraint::Fill(1),
            Constraint::Length(NUM_COL_WIDTH),
            Constraint::Length(NUM_COL_WIDTH),
            Constraint::Length(NUM_COL_WIDTH),
        ];

        let highlight = if focused {
            style_selected_focused()
        } else {
            style_selected()
        };
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(highlight)
            .column_spacing(1);

        // Reserve the last row of the body for the pagination footer.
        let table_area = Rect {
            height: body.height.saturating_sub(1),
            ..body
        };
        self.table_state.select(Some(self.selected));
        frame.render_stateful_widget(table, table_area, &mut self.table_state);

        let footer_area = Rect {
            x: body.x,
            y: body.y + body.height - 1,
            width: body.width,
            height: 1,
        };
        let mut footer = format!(
            " Page {} of {} · {} songs",
            state.pagination.current_page, state.pagination.total_pages, state.pagination.total_records,
        );
        if !state.query.title.is_empty() {
            footer.push_str(&format!(" · filter: \"{}\"", state.query.title));
        }
        frame.render_widget(
            Paragraph::new(Span::styled(footer, Style::default().fg(C_MUTED))),
            footer_area,
        );
    }
}

/// "★★★☆☆" for a 0-5 rating.
fn stars_line(rating: u8) -> Line<'static> {
    let filled = rating.min(5) as usize;
    Line::from(vec![
        Span::styled("★".repeat(filled), Style::default().fg(C_STARS)),
        Span::styled("☆".repeat(5 - filled), Style::default().fg(C_STARS_EMPTY)),
    ])
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut w = 0;
    for ch in text.chars() {
        let cw = UnicodeWidthStr::width(ch.encode_utf8(&mut [0u8; 4]) as &str);
        if w + cw + 1 > max_width {
            break;
        }
        out.push(ch);
        w += cw;
    }
    out.push('…');
    out
}
