//! In-process mock of the songs API for end-to-end tests.
//!
//! Reproduces the backend contract the client relies on: page-number
//! pagination, case-insensitive substring title filter, case-insensitive
//! sorting, and the rate endpoint's 1-5 validation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use dash_api::model::Song;

#[derive(Clone)]
struct MockState {
    songs: Arc<Mutex<Vec<Song>>>,
}

pub struct MockServer {
    pub base_url: String,
    songs: Arc<Mutex<Vec<Song>>>,
}

impl MockServer {
    pub async fn spawn() -> Self {
        Self::spawn_with(seed_songs()).await
    }

    pub async fn spawn_with(songs: Vec<Song>) -> Self {
        let songs = Arc::new(Mutex::new(songs));
        let state = MockState {
            songs: songs.clone(),
        };

        let app = Router::new()
            .route("/songs/", get(list_songs))
            .route("/songs/:id/rate/", patch(rate_song))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            songs,
        }
    }

    /// Server-side rating of a song, for asserting PATCH effects.
    pub fn stored_rating(&self, id: u64) -> Option<u8> {
        self.songs
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.rating)
    }
}

async fn list_songs(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let page: u32 = params
        .get("page")
        .map(|p| p.parse().map_err(|_| StatusCode::BAD_REQUEST))
        .transpose()?
        .unwrap_or(1);
    let per_page: usize = params
        .get("per_page")
        .map(|p| p.parse().map_err(|_| StatusCode::BAD_REQUEST))
        .transpose()?
        .unwrap_or(10);
    let sort_key = params.get("sort_key").map(String::as_str).unwrap_or("title");
    let direction = params.get("direction").map(String::as_str).unwrap_or("asc");
    let title = params.get("title").map(String::as_str).unwrap_or("");

    let mut songs: Vec<Song> = state.songs.lock().unwrap().clone();

    if !title.is_empty() {
        let needle = title.to_lowercase();
        songs.retain(|s| s.title.to_lowercase().contains(&needle));
    }

    songs.sort_by(|a, b| match sort_key {
        "danceability" => a.danceability.total_cmp(&b.danceability),
        "energy" => a.energy.total_cmp(&b.energy),
        "rating" => a.rating.cmp(&b.rating),
        _ => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    });
    if direction == "desc" {
        songs.reverse();
    }

    let total_records = songs.len();
    let total_pages = total_records.div_ceil(per_page).max(1) as u32;
    if page == 0 || page > total_pages {
        return Err(StatusCode::NOT_FOUND);
    }

    let start = (page as usize - 1) * per_page;
    let data: Vec<Song> = songs.into_iter().skip(start).take(per_page).collect();

    Ok(Json(json!({
        "data": data,
        "pagination": {
            "total_records": total_records,
            "current_page": page,
            "total_pages": total_pages,
            "next_page": if page < total_pages { Some(page + 1) } else { None },
            "prev_page": if page > 1 { Some(page - 1) } else { None },
        }
    })))
}

async fn rate_song(
    State(state): State<MockState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let rating = body
        .get("rating")
        .and_then(Value::as_u64)
        .ok_or(StatusCode::BAD_REQUEST)?;
    if !(1..=5).contains(&rating) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut songs = state.songs.lock().unwrap();
    let song = songs
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    song.rating = rating as u8;

    Ok(Json(json!({
        "message": "Rating updated successfully",
        "rating": song.rating,
    })))
}

/// 25 songs → three pages at the default per_page of 10. A few titles share
/// the substring "love" in mixed case for filter tests.
pub fn seed_songs() -> Vec<Song> {
    let titles = [
        "Acadia", "Blue Monday", "Crazy Love", "Delta Waves", "Echoes",
        "First Light", "Golden Hour", "Heatwave", "In Bloom", "Juniper",
        "Kaleidoscope", "Love Buzz", "Midnight City", "Northern Sky", "Orbit",
        "Paper Planes", "Quiet Storm", "Rollercoaster", "Silver Lining", "Tidal",
        "Undertow", "Velvet Morning", "Whatever Lovely", "Xylem", "Younger Now",
    ];
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| Song {
            id: i as u64 + 1,
            title: title.to_string(),
            danceability: 0.3 + 0.025 * i as f64,
            energy: 0.9 - 0.02 * i as f64,
            acousticness: 0.05 + 0.03 * i as f64,
            tempo: 90.0 + 3.0 * i as f64,
            duration_ms: 45_000 + 17_000 * i as u64,
            num_segments: 400 + 20 * i as u32,
            num_sections: 8 + (i as u32 % 5),
            rating: (i % 6) as u8,
        })
        .collect()
}
