//! List controller — the query state machine behind the song table.
//!
//! Owns the current page/sort/search parameters, the last successfully
//! fetched page of songs, and the pagination metadata the server reported
//! for it. Every parameter mutation triggers exactly one fetch; a failed
//! fetch clears the list and raises the no-results flag (single attempt,
//! no retry). Locally submitted ratings are merged into the in-memory list
//! without a refetch.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::client::{ApiClient, ApiError};
use crate::model::{Pagination, Song, SongQuery, SortKey};

pub struct ListController {
    client: ApiClient,
    query: SongQuery,
    songs: Vec<Song>,
    pagination: Pagination,
    no_results: bool,
    error: Option<String>,
    /// Ratings submitted this session, by song id. Overlays the fetched
    /// rating at display time so a re-render reflects the change even when
    /// the list itself has not been replaced.
    local_ratings: HashMap<u64, u8>,
}

impl ListController {
    pub fn new(client: ApiClient, per_page: u32) -> Self {
        Self {
            client,
            query: SongQuery {
                per_page,
                ..Default::default()
            },
            songs: Vec::new(),
            pagination: Pagination::default(),
            no_results: false,
            error: None,
            local_ratings: HashMap::new(),
        }
    }

    // ── Read access ───────────────────────────────────────────────────────────

    pub fn query(&self) -> &SongQuery {
        &self.query
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// True after a fetch that yielded nothing — empty result set or error.
    pub fn no_results(&self) -> bool {
        self.no_results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Rating to display for `song`: the locally submitted value wins over
    /// whatever the last fetch carried.
    pub fn display_rating(&self, song: &Song) -> u8 {
        self.local_ratings.get(&song.id).copied().unwrap_or(song.rating)
    }

    // ── Query mutations (each triggers exactly one fetch) ─────────────────────

    pub async fn set_page(&mut self, page: u32) {
        self.query.page = page.max(1);
        self.refresh().await;
    }

    /// Advance one page, if the server reported one.
    pub async fn next_page(&mut self) {
        if self.pagination.has_next() {
            self.query.page += 1;
            self.refresh().await;
        }
    }

    /// Go back one page, stopping at 1.
    pub async fn prev_page(&mut self) {
        if self.query.page > 1 {
            self.query.page -= 1;
            self.refresh().await;
        }
    }

    /// Sort by `key`: same key toggles the direction, a different key resets
    /// to ascending. Either way the page resets to 1.
    pub async fn set_sort(&mut self, key: SortKey) {
        if self.query.sort_key == key {
            self.query.direction = self.query.direction.toggled();
        } else {
            self.query.sort_key = key;
            self.query.direction = Default::default();
        }
        self.query.page = 1;
        self.refresh().await;
    }

    /// Set the title filter (trimmed) and reset to page 1.
    pub async fn set_search(&mut self, text: &str) {
        self.query.title = text.trim().to_string();
        self.query.page = 1;
        self.refresh().await;
    }

    /// Re-issue the fetch for the current query without mutating it.
    pub async fn refresh(&mut self) {
        match self.client.fetch_page(&self.query).await {
            Ok(page) => {
                self.no_results = page.data.is_empty();
                self.songs = page.data;
                self.pagination = page.pagination;
                self.error = None;
                debug!(
                    "loaded {} songs (page {}/{})",
                    self.songs.len(),
                    self.pagination.current_page,
                    self.pagination.total_pages
                );
            }
            Err(e) => {
                warn!("fetch failed: {}", e);
                self.songs.clear();
                self.pagination = Pagination::default();
                self.no_results = true;
                self.error = Some(e.to_string());
            }
        }
    }

    // ── Ratings ───────────────────────────────────────────────────────────────

    /// Submit a rating for `song_id`. On success, only the matching song's
    /// rating changes in the in-memory list; siblings are untouched and no
    /// refetch happens. On failure the list is left as-is and the error is
    /// returned for the caller to surface.
    pub async fn rate(&mut self, song_id: u64, score: u8) -> Result<(), ApiError> {
        let stored = self.client.rate(song_id, score).await?;
        if let Some(song) = self.songs.iter_mut().find(|s| s.id == song_id) {
            song.rating = stored;
        }
        self.local_ratings.insert(song_id, stored);
        Ok(())
    }

    // ── Export support ────────────────────────────────────────────────────────

    /// All songs for the current sort/search, concatenated across every page.
    /// Used only for full-dataset export; a failure aborts with no partial
    /// result.
    pub async fn fetch_all(&self) -> Result<Vec<Song>, ApiError> {
        self.client.fetch_all(&self.query).await
    }

    /// Snapshot of (client, query) for running `fetch_all` on a background
    /// task without borrowing the controller.
    pub fn export_handle(&self) -> (ApiClient, SongQuery) {
        (self.client.clone(), self.query.clone())
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
//
// Happy-path behavior against a live mock server lives in
// tests/e2e_controller_tests.rs; these cover the state transitions that hold
// regardless of fetch outcome.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SortDirection;
    use std::time::Duration;

    fn unreachable_controller() -> ListController {
        let client = ApiClient::new("http://127.0.0.1:1", Duration::from_millis(100)).unwrap();
        ListController::new(client, 10)
    }

    #[tokio::test]
    async fn test_sort_toggle_same_key_twice_returns_to_ascending() {
        let mut c = unreachable_controller();
        for key in SortKey::ALL {
            // Arrive from a different key so each cycle starts ascending —
            // selecting the already-active key would toggle instead.
            let other = if key == SortKey::Energy {
                SortKey::Title
            } else {
                SortKey::Energy
            };
            c.set_sort(other).await;
            c.set_sort(key).await;
            assert_eq!(c.query().sort_key, key);
            assert_eq!(c.query().direction, SortDirection::Asc);
            c.set_sort(key).await;
            assert_eq!(c.query().direction, SortDirection::Desc);
            c.set_sort(key).await;
            assert_eq!(c.query().direction, SortDirection::Asc);
        }
    }

    #[tokio::test]
    async fn test_sort_change_resets_page_and_direction() {
        let mut c = unreachable_controller();
        c.set_page(4).await;
        c.set_sort(SortKey::Energy).await;
        c.set_sort(SortKey::Energy).await; // now descending
        c.set_sort(SortKey::Rating).await; // new key: back to ascending
        assert_eq!(c.query().sort_key, SortKey::Rating);
        assert_eq!(c.query().direction, SortDirection::Asc);
        assert_eq!(c.query().page, 1);
    }

    #[tokio::test]
    async fn test_search_text_is_trimmed() {
        let mut c = unreachable_controller();
        c.set_search("  lov e \n").await;
        assert_eq!(c.query().title, "lov e");
        assert_eq!(c.query().page, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_clears_list_and_flags_no_results() {
        let mut c = unreachable_controller();
        c.refresh().await;
        assert!(c.songs().is_empty());
        assert!(c.no_results());
        assert!(c.error().is_some());
    }

    #[tokio::test]
    async fn test_page_clamps_to_one() {
        let mut c = unreachable_controller();
        c.set_page(0).await;
        assert_eq!(c.query().page, 1);
        c.prev_page().await;
        assert_eq!(c.query().page, 1);
    }

    #[tokio::test]
    async fn test_next_page_requires_server_reported_next() {
        let mut c = unreachable_controller();
        // No successful fetch yet, so pagination reports no next page.
        c.next_page().await;
        assert_eq!(c.query().page, 1);
    }
}
