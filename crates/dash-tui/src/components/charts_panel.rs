//! ChartsPanel component — the three datasets derived from the current page.
//!
//! Left to right: danceability/energy scatter, duration histogram, and the
//! per-song acousticness + tempo bar series. All three are views over
//! `AppState::charts`; the panel renders, it never aggregates.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_secondary, C_ACOUSTICNESS, C_HISTOGRAM, C_MUTED, C_SCATTER, C_SECONDARY, C_TEMPO,
    },
    widgets::pane_chrome::pane_chrome,
};

pub struct ChartsPanel {
    scatter_cache: Vec<(f64, f64)>,
}

impl ChartsPanel {
    pub fn new() -> Self {
        Self {
            scatter_cache: Vec::new(),
        }
    }

    fn draw_placeholder(frame: &mut Frame, area: Rect) {
        let message = Paragraph::new(Span::styled(
            "No data available to display the chart.",
            style_secondary(),
        ))
        .centered();
        frame.render_widget(message, area);
    }

    fn draw_scatter(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("Danceability vs Energy", focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if !state.charts.has_data() {
            Self::draw_placeholder(frame, inner);
            return;
        }

        self.scatter_cache = state.charts.scatter_coords();
        let dataset = Dataset::default()
            .name(format!("{} songs", self.scatter_cache.len()))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(C_SCATTER))
            .data(&self.scatter_cache);

        let chart = Chart::new(vec![dataset])
            .x_axis(
                Axis::default()
                    .title(Span::styled("danceability", Style::default().fg(C_MUTED)))
                    .style(Style::default().fg(C_MUTED))
                    .bounds([0.0, 1.0])
                    .labels(["0.0", "0.5", "1.0"]),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled("energy", Style::default().fg(C_MUTED)))
                    .style(Style::default().fg(C_MUTED))
                    .bounds([0.0, 1.0])
                    .labels(["0.0", "0.5", "1.0"]),
            );
        frame.render_widget(chart, inner);
    }

    fn draw_histogram(frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("Duration Histogram", focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if !state.charts.has_data() {
            Self::draw_placeholder(frame, inner);
            return;
        }

        let bars: Vec<Bar> = state
            .charts
            .histogram
            .iter()
            .map(|bin| {
                Bar::default()
                    .value(bin.count)
                    // "0-60 sec" → "0-60" to fit the bar width
                    .label(Line::from(bin.label.trim_end_matches(" sec")))
                    .style(Style::default().fg(C_HISTOGRAM))
            })
            .collect();

        let chart = BarChart::default()
            .bar_width(7)
            .bar_gap(1)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, inner);
    }

    fn draw_bars(frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("Acousticness · Tempo", focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if !state.charts.has_data() {
            Self::draw_placeholder(frame, inner);
            return;
        }

        // Acousticness is scaled ×100 so both series share the chart's value
        // axis; the text on each bar shows the raw value.
        let acoustic: Vec<Bar> = state
            .charts
            .bars
            .iter()
            .map(|entry| {
                Bar::default()
                    .value((entry.acousticness * 100.0).round() as u64)
                    .text_value(format!("{:.2}", entry.acousticness))
                    .label(Line::from(short_title(&entry.title)))
                    .style(Style::default().fg(C_ACOUSTICNESS))
            })
            .collect();
        let tempo: Vec<Bar> = state
            .charts
            .bars
            .iter()
            .map(|entry| {
                Bar::default()
                    .value(entry.tempo.round() as u64)
                    .text_value(format!("{:.0}", entry.tempo))
                    .label(Line::from(short_title(&entry.title)))
                    .style(Style::default().fg(C_TEMPO))
            })
            .collect();

        let chart = BarChart::default()
            .bar_width(4)
            .bar_gap(1)
            .group_gap(2)
            .label_style(Style::default().fg(C_SECONDARY))
            .data(BarGroup::default().label(Line::from("acoust")).bars(&acoustic))
            .data(BarGroup::default().label(Line::from("tempo")).bars(&tempo));
        frame.render_widget(chart, inner);
    }
}

/// First word of the title, clipped to the bar width.
fn short_title(title: &str) -> String {
    title
        .split_whitespace()
        .next()
        .unwrap_or(title)
        .chars()
        .take(4)
        .collect()
}

impl Component for ChartsPanel {
    fn id(&self) -> ComponentId {
        ComponentId::ChartsPanel
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        // Paging still works while the charts have focus — the charts follow
        // the list.
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => vec![Action::PrevPage],
            KeyCode::Right | KeyCode::Char('l') => vec![Action::NextPage],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(area);

        self.draw_scatter(frame, panes[0], focused, state);
        Self::draw_histogram(frame, panes[1], focused, state);
        Self::draw_bars(frame, panes[2], focused, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use ratatui::{backend::TestBackend, Terminal};

    use dash_api::aggregate::ChartData;
    use dash_api::model::{Song, SongQuery};

    fn song(id: u64, title: &str, duration_ms: u64) -> Song {
        Song {
            id,
            title: title.to_string(),
            danceability: 0.4,
            energy: 0.7,
            acousticness: 0.2,
            tempo: 120.0,
            duration_ms,
            num_segments: 500,
            num_sections: 9,
            rating: 3,
        }
    }

    fn state_with(songs: Vec<Song>) -> AppState {
        let mut state = AppState::new(
            SongQuery::default(),
            PathBuf::from("/tmp"),
            PathBuf::from("/tmp/tui.log"),
        );
        state.charts = ChartData::from_songs(&songs);
        state.songs = songs;
        state
    }

    fn rendered(panel: &mut ChartsPanel, state: &AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| panel.draw(f, f.area(), false, state))
            .unwrap();
        format!("{:?}", terminal.backend().buffer())
    }

    #[test]
    fn charts_render_series_and_bin_labels() {
        let mut panel = ChartsPanel::new();
        let state = state_with(vec![
            song(1, "Acadia", 70_000),
            song(2, "Blue Monday", 200_000),
            song(3, "Echoes", 400_000),
        ]);
        let text = rendered(&mut panel, &state, 180, 24);
        assert!(text.contains("Danceability vs Energy"));
        assert!(text.contains("0-60"));
        assert!(text.contains("acoust"));
        assert!(text.contains("tempo"));
    }

    #[test]
    fn empty_page_shows_placeholder_in_each_pane() {
        let mut panel = ChartsPanel::new();
        let state = state_with(Vec::new());
        let text = rendered(&mut panel, &state, 180, 24);
        assert_eq!(
            text.matches("No data available to display the chart.").count(),
            3
        );
    }
}
