//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns the list controller, all components, and `AppState` (shared
//!   read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background
//!   tasks (terminal input, full-dataset exports).
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action. List
//!   mutations go through the controller and the state is re-synced after,
//!   so the charts can never lag behind the table.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use dash_api::aggregate::ChartData;
use dash_api::controller::ListController;
use dash_api::export;

use crate::{
    action::{Action, ComponentId, ExportScope},
    app_state::AppState,
    component::Component,
    components::{
        charts_panel::ChartsPanel, export_dialog::ExportDialog, help_overlay::HelpOverlay,
        log_panel::LogPanel, song_table::SongTable,
    },
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    /// A background full-dataset export finished: path written + song count,
    /// or an error to surface.
    ExportDone(Result<(PathBuf, usize), String>),
}

// ── Pane area tracking ────────────────────────────────────────────────────────

/// Stores the last-drawn layout rects for each focusable pane.
/// Used by `handle_mouse` to do hit-testing without recomputing the layout.
#[derive(Default, Clone, Copy)]
struct PaneAreas {
    songs: Rect,
    charts: Rect,
    log: Rect,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    // ── Shared state (passed read-only to components) ─────────────────────────
    pub state: AppState,

    // ── Domain ────────────────────────────────────────────────────────────────
    controller: ListController,

    // ── Components ────────────────────────────────────────────────────────────
    song_table: SongTable,
    charts_panel: ChartsPanel,
    log_panel: LogPanel,
    help_overlay: HelpOverlay,
    export_dialog: ExportDialog,

    // ── Session bookkeeping ───────────────────────────────────────────────────
    focused: ComponentId,
    should_quit: bool,

    /// Last-drawn layout rects — used for mouse hit-testing.
    pane_areas: PaneAreas,

    /// Toast notification manager.
    toast: ToastManager,

    /// Sender used by export background tasks to report results.
    export_tx: Option<mpsc::Sender<AppMessage>>,
}

impl App {
    pub fn new(controller: ListController, export_dir: PathBuf, tui_log_path: PathBuf) -> Self {
        let state = AppState::new(controller.query().clone(), export_dir, tui_log_path);
        Self {
            state,
            controller,
            song_table: SongTable::new(),
            charts_panel: ChartsPanel::new(),
            log_panel: LogPanel::new(),
            help_overlay: HelpOverlay::new(),
            export_dialog: ExportDialog::new(),
            focused: ComponentId::SongTable,
            should_quit: false,
            pane_areas: PaneAreas::default(),
            toast: ToastManager::new(),
            export_tx: None,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(64);
        self.export_tx = Some(tx.clone());

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // Initial fetch before the first frame.
        self.controller.refresh().await;
        self.sync_state();
        if let Some(err) = self.controller.error() {
            self.toast.error(format!("initial fetch failed: {}", err));
        }

        // ── Periodic timers ───────────────────────────────────────────────────

        // Toast expiry check + spinner animation: 100ms for smooth animation
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // tui.log tail refresh: every 2s, only when log panel is open
        let mut log_refresh = tokio::time::interval(Duration::from_secs(2));
        log_refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        loop {
            terminal.draw(|f| self.draw(f))?;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    self.handle_message(msg).await;
                }

                _ = ui_tick.tick() => {
                    self.toast.tick();
                }

                _ = log_refresh.tick() => {
                    if self.log_panel.expanded {
                        self.reload_tui_log();
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("songdash exited cleanly");
        Ok(())
    }

    // ── Message handling ──────────────────────────────────────────────────────

    async fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return;
                    }
                    let actions = self.handle_key(key);
                    for a in actions {
                        self.dispatch(a).await;
                    }
                }
                Event::Mouse(mouse) => {
                    let actions = self.handle_mouse(mouse);
                    for a in actions {
                        self.dispatch(a).await;
                    }
                }
                Event::Resize(w, h) => {
                    self.dispatch(Action::Resize(w, h)).await;
                }
                _ => {}
            },

            AppMessage::ExportDone(result) => {
                self.state.export_in_flight = false;
                match result {
                    Ok((path, count)) => {
                        info!("export finished: {} songs -> {}", count, path.display());
                        self.toast.resolve_spinner(
                            crate::widgets::toast::Severity::Success,
                            format!("exported {} songs to {}", count, path.display()),
                            Duration::from_secs(5),
                        );
                    }
                    Err(e) => {
                        warn!("export failed: {}", e);
                        self.toast.resolve_spinner(
                            crate::widgets::toast::Severity::Error,
                            format!("export failed: {}", e),
                            Duration::from_secs(5),
                        );
                    }
                }
            }
        }
    }

    // ── Keyboard routing ──────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        // Ctrl+C always quits, even inside modals or the search bar.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }

        // Modals consume the keyboard while open.
        if self.help_overlay.visible {
            return self.help_overlay.handle_key(key, &self.state);
        }
        if self.export_dialog.visible {
            return self.export_dialog.handle_key(key, &self.state);
        }

        // While typing a search, everything goes to the table's input.
        if self.song_table.search.is_active() {
            return self.song_table.handle_key(key, &self.state);
        }

        // Global keys.
        match key.code {
            KeyCode::Char('q') => return vec![Action::Quit],
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::Char('?') => return vec![Action::ToggleHelp],
            KeyCode::Char('L') => return vec![Action::ToggleLogs],
            _ => {}
        }

        match self.focused {
            ComponentId::SongTable => self.song_table.handle_key(key, &self.state),
            ComponentId::ChartsPanel => self.charts_panel.handle_key(key, &self.state),
            ComponentId::LogPanel => self.log_panel.handle_key(key, &self.state),
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<Action> {
        if self.help_overlay.visible || self.export_dialog.visible {
            return vec![];
        }
        let pos = (mouse.column, mouse.row);
        let areas = self.pane_areas;
        if contains(areas.songs, pos) {
            self.focused = self.song_table.id();
            return self.song_table.handle_mouse(mouse, areas.songs, &self.state);
        }
        if contains(areas.charts, pos) {
            self.focused = self.charts_panel.id();
            return self.charts_panel.handle_mouse(mouse, areas.charts, &self.state);
        }
        if self.log_panel.expanded && contains(areas.log, pos) {
            self.focused = self.log_panel.id();
            return self.log_panel.handle_mouse(mouse, areas.log, &self.state);
        }
        vec![]
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    /// Apply `action` and any follow-up actions components emit in response.
    /// A queue instead of recursion; follow-up chains are short (a dialog
    /// closing, a selection clamp).
    async fn dispatch(&mut self, action: Action) {
        let mut queue = vec![action];
        while let Some(action) = queue.pop() {
            let followups = self.apply(action).await;
            queue.extend(followups);
        }

        self.state.input_mode = if self.song_table.search.is_active() {
            InputMode::Search
        } else {
            InputMode::Normal
        };
    }

    async fn apply(&mut self, action: Action) -> Vec<Action> {
        match &action {
            Action::NextPage => {
                self.controller.next_page().await;
                self.sync_state();
            }
            Action::PrevPage => {
                self.controller.prev_page().await;
                self.sync_state();
            }
            Action::Sort(key) => {
                self.controller.set_sort(*key).await;
                self.sync_state();
            }
            Action::SearchChanged(text) => {
                self.controller.set_search(text).await;
                self.sync_state();
            }
            Action::SearchSubmitted => {
                self.controller.refresh().await;
                self.sync_state();
            }
            Action::Rate(song_id, score) => {
                let title = self
                    .state
                    .songs
                    .iter()
                    .find(|s| s.id == *song_id)
                    .map(|s| s.title.clone())
                    .unwrap_or_default();
                match self.controller.rate(*song_id, *score).await {
                    Ok(()) => {
                        self.toast
                            .success(format!("rated \"{}\" {}★", title, score));
                    }
                    Err(e) => {
                        warn!("rating failed: {}", e);
                        self.toast.error(format!("rating failed: {}", e));
                    }
                }
                self.sync_state();
            }
            Action::Export(scope) => self.start_export(*scope).await,
            Action::FocusNext => self.cycle_focus(),
            Action::ToggleLogs => {
                // The component flips its own `expanded` in on_action below;
                // here we adjust focus and preload the tail.
                if !self.log_panel.expanded {
                    self.reload_tui_log();
                    self.focused = ComponentId::LogPanel;
                } else if self.focused == ComponentId::LogPanel {
                    self.focused = ComponentId::SongTable;
                }
            }
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => self.toast.info(format!("copied \"{}\"", text)),
                    Err(e) => self.toast.error(format!("clipboard error: {}", e)),
                }
            }
            Action::Quit => self.should_quit = true,
            Action::OpenExportDialog
            | Action::CloseExportDialog
            | Action::ToggleHelp
            | Action::Resize(..)
            | Action::Noop => {}
        }

        // Let every component observe the action (selection clamps, modal
        // visibility, panel toggles).
        let s = &self.state;
        let mut followups = Vec::new();
        followups.extend(self.song_table.on_action(&action, s));
        followups.extend(self.charts_panel.on_action(&action, s));
        followups.extend(self.log_panel.on_action(&action, s));
        followups.extend(self.help_overlay.on_action(&action, s));
        followups.extend(self.export_dialog.on_action(&action, s));
        followups
    }

    fn cycle_focus(&mut self) {
        let mut order = vec![self.song_table.id(), self.charts_panel.id()];
        if self.log_panel.expanded {
            order.push(self.log_panel.id());
        }
        let idx = order.iter().position(|id| *id == self.focused).unwrap_or(0);
        self.focused = order[(idx + 1) % order.len()];
    }

    // ── Export ────────────────────────────────────────────────────────────────

    async fn start_export(&mut self, scope: ExportScope) {
        match scope {
            ExportScope::CurrentPage => {
                match export::write_csv(&self.state.export_dir, &self.state.songs).await {
                    Ok(path) => {
                        self.toast.success(format!(
                            "exported {} songs to {}",
                            self.state.songs.len(),
                            path.display()
                        ));
                    }
                    Err(e) => {
                        warn!("export failed: {}", e);
                        self.toast.error(format!("export failed: {}", e));
                    }
                }
            }
            ExportScope::AllSongs => {
                if self.state.export_in_flight {
                    self.toast.warning("an export is already running");
                    return;
                }
                let Some(tx) = self.export_tx.clone() else {
                    return;
                };
                let (client, query) = self.controller.export_handle();
                let dir = self.state.export_dir.clone();
                self.state.export_in_flight = true;
                self.toast.spinner(format!(
                    "exporting {} matching songs…",
                    self.state.pagination.total_records
                ));
                tokio::spawn(async move {
                    let result = match client.fetch_all(&query).await {
                        Ok(songs) => match export::write_csv(&dir, &songs).await {
                            Ok(path) => Ok((path, songs.len())),
                            Err(e) => Err(e.to_string()),
                        },
                        Err(e) => Err(e.to_string()),
                    };
                    let _ = tx.send(AppMessage::ExportDone(result)).await;
                });
            }
        }
    }

    // ── State sync ────────────────────────────────────────────────────────────

    /// Mirror the controller into `AppState` and recompute the chart datasets.
    /// Called after every controller operation.
    fn sync_state(&mut self) {
        self.state.songs = self
            .controller
            .songs()
            .iter()
            .map(|song| {
                let mut s = song.clone();
                s.rating = self.controller.display_rating(song);
                s
            })
            .collect();
        self.state.query = self.controller.query().clone();
        self.state.pagination = self.controller.pagination().clone();
        self.state.no_results = self.controller.no_results();
        self.state.error = self.controller.error().map(|e| e.to_string());
        self.state.charts = ChartData::from_songs(&self.state.songs);
        self.state.last_log = match &self.state.error {
            Some(err) => Some(err.clone()),
            None => Some(format!(
                "page {}/{} · {} songs",
                self.state.pagination.current_page,
                self.state.pagination.total_pages,
                self.state.pagination.total_records
            )),
        };
    }

    /// Read the last 500 lines of tui.log into state.tui_log_lines (synchronous, cheap).
    fn reload_tui_log(&mut self) {
        let path = &self.state.tui_log_path;
        if let Ok(content) = std::fs::read_to_string(path) {
            let lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();
            let start = lines.len().saturating_sub(500);
            self.state.tui_log_lines = lines[start..].to_vec();
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let mut constraints = vec![Constraint::Fill(3), Constraint::Fill(2)];
        if self.log_panel.expanded {
            constraints.push(Constraint::Length(12));
        }
        let panes = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(rows[0]);

        self.pane_areas.songs = panes[0];
        self.pane_areas.charts = panes[1];
        self.song_table.draw(
            frame,
            panes[0],
            self.focused == ComponentId::SongTable,
            &self.state,
        );
        self.charts_panel.draw(
            frame,
            panes[1],
            self.focused == ComponentId::ChartsPanel,
            &self.state,
        );
        if self.log_panel.expanded {
            self.pane_areas.log = panes[2];
            self.log_panel.draw(
                frame,
                panes[2],
                self.focused == ComponentId::LogPanel,
                &self.state,
            );
        } else {
            self.pane_areas.log = Rect::default();
        }

        status_bar::draw_separator(frame, rows[1]);
        status_bar::draw_log_bar(
            frame,
            rows[2],
            self.state.last_log.as_deref(),
            self.state.api_ok(),
        );
        status_bar::draw_keys_bar(frame, rows[3], self.state.input_mode);

        // Overlays draw on top of everything.
        self.export_dialog.draw(frame, area, true, &self.state);
        self.help_overlay.draw(frame, area, true, &self.state);
        self.toast.draw(frame, area);
    }
}

fn contains(area: Rect, (x, y): (u16, u16)) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_api::client::ApiClient;

    fn app() -> App {
        let client =
            ApiClient::new("http://127.0.0.1:1", Duration::from_millis(100)).unwrap();
        let controller = ListController::new(client, 10);
        App::new(
            controller,
            PathBuf::from("/tmp"),
            PathBuf::from("/tmp/tui.log"),
        )
    }

    #[test]
    fn focus_cycles_through_visible_panes() {
        let mut app = app();
        assert_eq!(app.focused, ComponentId::SongTable);
        app.cycle_focus();
        assert_eq!(app.focused, ComponentId::ChartsPanel);
        app.cycle_focus();
        assert_eq!(app.focused, ComponentId::SongTable);

        // The log pane joins the cycle only while expanded.
        app.log_panel.toggle();
        app.cycle_focus();
        app.cycle_focus();
        assert_eq!(app.focused, ComponentId::LogPanel);
        app.cycle_focus();
        assert_eq!(app.focused, ComponentId::SongTable);
    }

    #[test]
    fn mouse_hit_testing_uses_drawn_rects() {
        let mut app = app();
        app.pane_areas.songs = Rect::new(0, 0, 80, 10);
        app.pane_areas.charts = Rect::new(0, 10, 80, 8);
        assert!(contains(app.pane_areas.songs, (79, 9)));
        assert!(!contains(app.pane_areas.songs, (0, 10)));
        assert!(contains(app.pane_areas.charts, (0, 10)));
        assert!(!contains(app.pane_areas.log, (0, 0)));
    }
}
