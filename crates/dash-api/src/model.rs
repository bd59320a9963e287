//! Wire types for the songs API.

use serde::{Deserialize, Serialize};

/// One track as returned by `GET /songs/`.
///
/// Audio features (`danceability`, `energy`, `acousticness`) are normalized
/// to 0.0–1.0 by the backend; `tempo` is BPM. The server stores an unrated
/// song as `rating: null` — decoded here as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: u64,
    pub title: String,
    pub danceability: f64,
    pub energy: f64,
    pub acousticness: f64,
    pub tempo: f64,
    pub duration_ms: u64,
    #[serde(default)]
    pub num_segments: u32,
    #[serde(default)]
    pub num_sections: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub rating: u8,
}

fn null_as_zero<'de, D>(de: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v: Option<u8> = Option::deserialize(de)?;
    Ok(v.unwrap_or(0))
}

impl Song {
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }
}

/// Server-side sort columns accepted by the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Title,
    Danceability,
    Energy,
    Rating,
}

impl SortKey {
    /// Value sent in the `sort_key` query parameter.
    pub fn param(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Danceability => "danceability",
            Self::Energy => "energy",
            Self::Rating => "rating",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Danceability => "Danceability",
            Self::Energy => "Energy",
            Self::Rating => "Rating",
        }
    }

    pub const ALL: [SortKey; 4] = [
        SortKey::Title,
        SortKey::Danceability,
        SortKey::Energy,
        SortKey::Rating,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn param(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Arrow glyph for column headers.
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

/// The page/sort/search parameters driving the next fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct SongQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort_key: SortKey,
    pub direction: SortDirection,
    /// Trimmed search text; empty = no filter.
    pub title: String,
}

impl Default for SongQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            sort_key: SortKey::default(),
            direction: SortDirection::default(),
            title: String::new(),
        }
    }
}

impl SongQuery {
    /// Query-string pairs for the list endpoint. The title parameter is
    /// omitted when empty, matching what the backend treats as "no filter".
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut p = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
            ("sort_key", self.sort_key.param().to_string()),
            ("direction", self.direction.param().to_string()),
        ];
        if !self.title.is_empty() {
            p.push(("title", self.title.clone()));
        }
        p
    }
}

/// Paging bounds reported by the server for the current query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total_records: u64,
    #[serde(default = "one")]
    pub current_page: u32,
    #[serde(default = "one")]
    pub total_pages: u32,
    pub next_page: Option<u32>,
    pub prev_page: Option<u32>,
}

fn one() -> u32 {
    1
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }
}

/// Full response body of `GET /songs/`.
#[derive(Debug, Clone, Deserialize)]
pub struct SongPage {
    #[serde(default)]
    pub data: Vec<Song>,
    #[serde(default)]
    pub pagination: Pagination,
}

// ── tests ─────────────────────────────────────────────────────────────────────
