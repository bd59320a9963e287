//! Action enum — all user-initiated intents and internal events.

use dash_api::model::SortKey;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    SongTable,
    ChartsPanel,
    LogPanel,
    ExportDialog,
    HelpOverlay,
}

/// Which song set a CSV export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    CurrentPage,
    AllSongs,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── List / query ─────────────────────────────────────────────────────────
    NextPage,
    PrevPage,
    Sort(SortKey),
    /// Live edit of the search text (each change triggers a fetch).
    SearchChanged(String),
    /// Explicit submission — re-issues the fetch for the current query.
    SearchSubmitted,
    /// Rate a song 1-5 by id.
    Rate(u64, u8),

    // ── Export ───────────────────────────────────────────────────────────────
    OpenExportDialog,
    CloseExportDialog,
    Export(ExportScope),

    // ── Navigation / UI ──────────────────────────────────────────────────────
    FocusNext,
    ToggleHelp,
    ToggleLogs,
    CopyToClipboard(String),
    Quit,
    Resize(u16, u16),
    Noop,
}
