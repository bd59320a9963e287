//! End-to-end tests for the list controller against the mock server.

mod common;

use std::time::Duration;

use common::{seed_songs, MockServer};
use dash_api::client::ApiClient;
use dash_api::controller::ListController;
use dash_api::model::{SortDirection, SortKey};

async fn controller_for(server: &MockServer) -> ListController {
    let client = ApiClient::new(server.base_url.clone(), Duration::from_secs(5)).unwrap();
    ListController::new(client, 10)
}

#[tokio::test]
async fn test_initial_refresh_loads_first_page() {
    let server = MockServer::spawn().await;
    let mut c = controller_for(&server).await;

    c.refresh().await;
    assert_eq!(c.songs().len(), 10);
    assert!(!c.no_results());
    assert!(c.error().is_none());
    assert_eq!(c.pagination().total_pages, 3);
    assert!(c.pagination().has_next());
}

#[tokio::test]
async fn test_paging_forward_and_back() {
    let server = MockServer::spawn().await;
    let mut c = controller_for(&server).await;
    c.refresh().await;

    c.next_page().await;
    assert_eq!(c.query().page, 2);
    assert_eq!(c.pagination().current_page, 2);
    let page2_first = c.songs()[0].title.clone();

    c.next_page().await;
    assert_eq!(c.query().page, 3);
    assert_eq!(c.songs().len(), 5);
    assert!(!c.pagination().has_next());

    // No next page reported: stays put.
    c.next_page().await;
    assert_eq!(c.query().page, 3);

    c.prev_page().await;
    assert_eq!(c.query().page, 2);
    assert_eq!(c.songs()[0].title, page2_first);
}

#[tokio::test]
async fn test_sort_toggle_refetches_and_reverses() {
    let server = MockServer::spawn().await;
    let mut c = controller_for(&server).await;
    c.refresh().await;

    c.set_sort(SortKey::Danceability).await;
    assert_eq!(c.query().direction, SortDirection::Asc);
    let ascending_first = c.songs()[0].danceability;

    c.set_sort(SortKey::Danceability).await;
    assert_eq!(c.query().direction, SortDirection::Desc);
    assert!(c.songs()[0].danceability >= ascending_first);

    c.set_sort(SortKey::Danceability).await;
    assert_eq!(c.query().direction, SortDirection::Asc);
    assert_eq!(c.songs()[0].danceability, ascending_first);
}

#[tokio::test]
async fn test_search_filters_and_resets_page() {
    let server = MockServer::spawn().await;
    let mut c = controller_for(&server).await;
    c.refresh().await;
    c.next_page().await;

    c.set_search("  love ").await;
    assert_eq!(c.query().page, 1);
    assert_eq!(c.query().title, "love");
    assert!(!c.no_results());
    for song in c.songs() {
        assert!(song.title.to_lowercase().contains("love"));
    }
}

#[tokio::test]
async fn test_search_with_no_matches_flags_no_results() {
    let server = MockServer::spawn().await;
    let mut c = controller_for(&server).await;

    c.set_search("xyzzy-no-such-song").await;
    assert!(c.songs().is_empty());
    assert!(c.no_results());
    // An empty result set is not an error.
    assert!(c.error().is_none());
}

#[tokio::test]
async fn test_rate_updates_only_the_target_song() {
    let server = MockServer::spawn().await;
    let mut c = controller_for(&server).await;
    c.refresh().await;

    let before: Vec<(u64, u8)> = c.songs().iter().map(|s| (s.id, s.rating)).collect();
    let target = c.songs()[4].id;

    c.rate(target, 5).await.unwrap();

    for song in c.songs() {
        if song.id == target {
            assert_eq!(song.rating, 5);
            assert_eq!(c.display_rating(song), 5);
        } else {
            let old = before.iter().find(|(id, _)| *id == song.id).unwrap().1;
            assert_eq!(song.rating, old, "sibling rating changed");
        }
    }
    assert_eq!(server.stored_rating(target), Some(5));
}

#[tokio::test]
async fn test_rate_failure_leaves_list_unchanged() {
    let server = MockServer::spawn().await;
    let mut c = controller_for(&server).await;
    c.refresh().await;

    let before: Vec<u8> = c.songs().iter().map(|s| s.rating).collect();
    assert!(c.rate(424242, 4).await.is_err());
    let after: Vec<u8> = c.songs().iter().map(|s| s.rating).collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_local_rating_survives_rerender_not_refetch() {
    let server = MockServer::spawn().await;
    let mut c = controller_for(&server).await;
    c.refresh().await;

    let target = c.songs()[0].id;
    c.rate(target, 3).await.unwrap();

    // The overlay keeps reporting the submitted value for this song even if
    // a later list replacement carried a stale rating.
    let stale = common::seed_songs().into_iter().find(|s| s.id == target).unwrap();
    assert_eq!(c.display_rating(&stale), 3);
}

#[tokio::test]
async fn test_fetch_all_respects_current_filter() {
    let server = MockServer::spawn().await;
    let mut c = controller_for(&server).await;
    c.set_search("love").await;

    let all = c.fetch_all().await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|s| s.title.to_lowercase().contains("love")));
}

#[tokio::test]
async fn test_small_dataset_single_page() {
    let server = MockServer::spawn_with(seed_songs().into_iter().take(2).collect()).await;
    let mut c = controller_for(&server).await;

    c.refresh().await;
    assert_eq!(c.songs().len(), 2);
    assert_eq!(c.pagination().total_pages, 1);
    assert!(!c.pagination().has_next());
}
