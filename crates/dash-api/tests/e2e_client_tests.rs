//! End-to-end tests for the API client against the in-process mock server.

mod common;

use std::time::Duration;

use common::{seed_songs, MockServer};
use dash_api::client::{ApiClient, ApiError};
use dash_api::model::{SongQuery, SortDirection, SortKey};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(server.base_url.clone(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_page_returns_per_page_songs_and_metadata() {
    let server = MockServer::spawn().await;
    let client = client_for(&server);

    let page = client.fetch_page(&SongQuery::default()).await.unwrap();
    assert_eq!(page.data.len(), 10);
    assert_eq!(page.pagination.total_records, 25);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.pagination.next_page, Some(2));
    assert_eq!(page.pagination.prev_page, None);
}

#[tokio::test]
async fn test_fetch_page_sorted_descending_by_energy() {
    let server = MockServer::spawn().await;
    let client = client_for(&server);

    let query = SongQuery {
        sort_key: SortKey::Energy,
        direction: SortDirection::Desc,
        ..Default::default()
    };
    let page = client.fetch_page(&query).await.unwrap();
    let energies: Vec<f64> = page.data.iter().map(|s| s.energy).collect();
    let mut sorted = energies.clone();
    sorted.sort_by(|a, b| b.total_cmp(a));
    assert_eq!(energies, sorted);
}

#[tokio::test]
async fn test_search_results_contain_query_as_substring() {
    let server = MockServer::spawn().await;
    let client = client_for(&server);

    let query = SongQuery {
        title: "love".to_string(),
        ..Default::default()
    };
    let page = client.fetch_page(&query).await.unwrap();
    assert!(!page.data.is_empty());
    for song in &page.data {
        assert!(
            song.title.to_lowercase().contains("love"),
            "{:?} does not match filter",
            song.title
        );
    }
    // "Crazy Love", "Love Buzz", "Whatever Lovely"
    assert_eq!(page.pagination.total_records, 3);
}

#[tokio::test]
async fn test_fetch_all_concatenates_three_pages_in_order() {
    let server = MockServer::spawn().await;
    let client = client_for(&server);

    let all = client.fetch_all(&SongQuery::default()).await.unwrap();
    assert_eq!(all.len(), 25);

    // Server order: title ascending, case-insensitive — the concatenation
    // must preserve it across page boundaries.
    let titles: Vec<String> = all.iter().map(|s| s.title.to_lowercase()).collect();
    let mut sorted = titles.clone();
    sorted.sort();
    assert_eq!(titles, sorted);
}

#[tokio::test]
async fn test_fetch_all_single_page_terminates() {
    let server = MockServer::spawn_with(seed_songs().into_iter().take(4).collect()).await;
    let client = client_for(&server);

    let all = client.fetch_all(&SongQuery::default()).await.unwrap();
    assert_eq!(all.len(), 4);
}

#[tokio::test]
async fn test_rate_persists_on_server() {
    let server = MockServer::spawn().await;
    let client = client_for(&server);

    let stored = client.rate(3, 5).await.unwrap();
    assert_eq!(stored, 5);
    assert_eq!(server.stored_rating(3), Some(5));
}

#[tokio::test]
async fn test_rate_unknown_song_is_status_error() {
    let server = MockServer::spawn().await;
    let client = client_for(&server);

    match client.rate(9999, 3).await {
        Err(ApiError::Status(code)) => assert_eq!(code.as_u16(), 404),
        other => panic!("expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_out_of_range_page_is_status_error() {
    let server = MockServer::spawn().await;
    let client = client_for(&server);

    let query = SongQuery {
        page: 99,
        ..Default::default()
    };
    match client.fetch_page(&query).await {
        Err(ApiError::Status(code)) => assert_eq!(code.as_u16(), 404),
        other => panic!("expected Status error, got {:?}", other.map(|_| ())),
    }
}
