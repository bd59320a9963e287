//! Songs API client.
//!
//! One attempt per call, no retries. Every failure collapses into an
//! [`ApiError`] at the call site; callers decide how to surface it.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{Song, SongPage, SongQuery};

/// Failure taxonomy for calls against the songs API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection-level failure (DNS, refused, timeout).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
    /// The body did not decode as the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[source] reqwest::Error),
    /// Rating outside 1–5; rejected before any request is made.
    #[error("invalid rating {0}, must be 1-5")]
    InvalidRating(u8),
}

/// Body of a successful `PATCH /songs/{id}/rate/`. The backend returns more
/// fields than this; only the updated rating matters to the client.
#[derive(Debug, Deserialize)]
struct RateResponse {
    rating: u8,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:8000/api`.
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one page of songs for `query`.
    pub async fn fetch_page(&self, query: &SongQuery) -> Result<SongPage, ApiError> {
        let url = format!("{}/songs/", self.base_url);
        debug!("GET {} page={} sort={}/{} title={:?}",
            url, query.page, query.sort_key.param(), query.direction.param(), query.title);

        let response = self
            .http
            .get(&url)
            .query(&query.params())
            .send()
            .await
            .map_err(ApiError::Network)?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        response.json::<SongPage>().await.map_err(ApiError::Decode)
    }

    /// Fetch every page for `query`, sequentially, concatenating results in
    /// server-returned order. Starts from page 1 regardless of `query.page`
    /// and stops when the server reports no next page. The loop is unbounded
    /// by contract — a server that always reports a next page never ends it.
    pub async fn fetch_all(&self, query: &SongQuery) -> Result<Vec<Song>, ApiError> {
        let mut all = Vec::new();
        let mut page_query = SongQuery {
            page: 1,
            ..query.clone()
        };

        loop {
            let page = self.fetch_page(&page_query).await?;
            let more = page.pagination.has_next();
            all.extend(page.data);
            if !more {
                break;
            }
            page_query.page += 1;
        }

        debug!("fetch_all: {} songs over {} pages", all.len(), page_query.page);
        Ok(all)
    }

    /// Submit a 1–5 star rating for `song_id`. Returns the rating the server
    /// stored.
    pub async fn rate(&self, song_id: u64, rating: u8) -> Result<u8, ApiError> {
        if !(1..=5).contains(&rating) {
            return Err(ApiError::InvalidRating(rating));
        }

        let url = format!("{}/songs/{}/rate/", self.base_url, song_id);
        debug!("PATCH {} rating={}", url, rating);

        let response = self
            .http
            .patch(&url)
            .json(&serde_json::json!({ "rating": rating }))
            .send()
            .await
            .map_err(ApiError::Network)?;

        if !response.status().is_success() {
            warn!("rate {}: server returned {}", song_id, response.status());
            return Err(ApiError::Status(response.status()));
        }

        let body: RateResponse = response.json().await.map_err(ApiError::Decode)?;
        Ok(body.rating)
    }
}
