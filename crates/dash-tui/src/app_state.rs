//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this, but never mutate it. The App event-loop is the only
//! thing that writes to AppState: after every list-controller operation it
//! re-syncs the song list and recomputes the chart datasets, so derived views
//! can never go stale relative to the list.

use std::path::PathBuf;

use dash_api::aggregate::ChartData;
use dash_api::model::{Pagination, Song, SongQuery};

use crate::widgets::status_bar::InputMode;

/// The full shared state of the application.
pub struct AppState {
    // ── Song list (mirror of the list controller) ───────────────────────────
    /// Current page of songs, with locally submitted ratings already applied.
    pub songs: Vec<Song>,
    pub query: SongQuery,
    pub pagination: Pagination,
    /// Last fetch yielded nothing — empty result set or error.
    pub no_results: bool,
    /// Human-readable fetch error, if the last fetch failed.
    pub error: Option<String>,

    // ── Derived charts (recomputed on every list change) ────────────────────
    pub charts: ChartData,

    // ── UI mode ─────────────────────────────────────────────────────────────
    pub input_mode: InputMode,
    /// A full-dataset export is in flight.
    pub export_in_flight: bool,

    // ── Session ─────────────────────────────────────────────────────────────
    /// Most recent status line for the footer.
    pub last_log: Option<String>,
    /// Cached tail of the log file (refreshed while the log panel is open).
    pub tui_log_lines: Vec<String>,

    // ── Paths ───────────────────────────────────────────────────────────────
    pub export_dir: PathBuf,
    pub tui_log_path: PathBuf,
}

impl AppState {
    pub fn new(query: SongQuery, export_dir: PathBuf, tui_log_path: PathBuf) -> Self {
        Self {
            songs: Vec::new(),
            query,
            pagination: Pagination::default(),
            no_results: false,
            error: None,
            charts: ChartData::default(),
            input_mode: InputMode::Normal,
            export_in_flight: false,
            last_log: None,
            tui_log_lines: Vec::new(),
            export_dir,
            tui_log_path,
        }
    }

    /// Convenience: the API connection is healthy as far as we know.
    pub fn api_ok(&self) -> bool {
        self.error.is_none()
    }
}
