//! Index scan tests against a mock puzzle site

use crate::common::{crawler, index_page, mount_index_page, INDEX_PATH};
use kakurizer::crawler::run_scan;
use kakurizer::record::{CandidateRecord, Difficulty};
use kakurizer::storage::{open_storage, RunKind, RunStatus, SqliteStorage, Store};
use kakurizer::{FetchError, KakurizerError};
use std::collections::HashSet;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn known(id: i64) -> CandidateRecord {
    CandidateRecord {
        id,
        published_at_millis: 1_500_000_000_000,
        detail_url: format!("https://example.com/kakuro-{}-hard", id),
        difficulty: Difficulty::High,
    }
}

fn store_with(ids: &[i64]) -> SqliteStorage {
    let mut store = SqliteStorage::new_in_memory().expect("Failed to open in-memory store");
    let records: Vec<_> = ids.iter().map(|&id| known(id)).collect();
    store.insert_new(&records).expect("Failed to seed store");
    store
}

#[tokio::test]
async fn test_two_page_scan_stops_after_known_puzzle() {
    let server = MockServer::start().await;
    mount_index_page(&server, 1, index_page(&server, &[10, 9, 8]), 1).await;
    mount_index_page(&server, 2, index_page(&server, &[7, 6]), 1).await;
    // Never requested: 6 on page 2 is already known
    mount_index_page(&server, 3, index_page(&server, &[5, 4]), 0).await;

    let crawler = crawler(&server);
    let store = store_with(&[6]);

    let found = crawler
        .discover_new(&store)
        .await
        .expect("Discovery failed");

    let ids: Vec<i64> = found.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![10, 9, 8, 7]);
    assert_eq!(found[0].difficulty, Difficulty::High);
    assert_eq!(
        found[0].detail_url,
        format!("{}/lifeandstyle/kakuro-10-hard", server.uri())
    );
}

#[tokio::test]
async fn test_thousands_separator_in_title() {
    let server = MockServer::start().await;
    mount_index_page(&server, 1, index_page(&server, &[1583, 1582]), 1).await;
    mount_index_page(&server, 2, index_page(&server, &[1581]), 1).await;

    let crawler = crawler(&server);
    let store = store_with(&[1581]);

    let found = crawler
        .discover_new(&store)
        .await
        .expect("Discovery failed");

    let ids: Vec<i64> = found.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1583, 1582]);
}

#[tokio::test]
async fn test_repeated_scan_only_reads_first_page() {
    let server = MockServer::start().await;
    mount_index_page(&server, 1, index_page(&server, &[10, 9, 8]), 2).await;
    mount_index_page(&server, 2, index_page(&server, &[7, 6]), 1).await;

    let crawler = crawler(&server);
    let mut store = store_with(&[6]);

    let first = run_scan(&crawler, &mut store, "hash")
        .await
        .expect("First scan failed");
    assert_eq!(first.saved, 4);
    assert_eq!(first.pages_fetched, 2);

    let second = run_scan(&crawler, &mut store, "hash")
        .await
        .expect("Second scan failed");
    assert_eq!(second.saved, 0);
    assert_eq!(second.pages_fetched, 1);

    assert_eq!(
        store.query_existing_ids(1, 100).expect("Query failed"),
        HashSet::from([10, 9, 8, 7, 6])
    );

    let run = store
        .get_latest_run(RunKind::Scan)
        .expect("Query failed")
        .expect("Scan run recorded");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.processed, 0);
}

#[tokio::test]
async fn test_server_error_fails_scan_without_saving() {
    let server = MockServer::start().await;
    mount_index_page(&server, 1, index_page(&server, &[10, 9]), 1).await;
    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let crawler = crawler(&server);
    let mut store = store_with(&[]);

    let result = run_scan(&crawler, &mut store, "hash").await;

    assert!(matches!(
        result,
        Err(KakurizerError::Fetch(FetchError::Status { status: 503, .. }))
    ));
    assert_eq!(store.count_puzzles().expect("Count failed"), 0);
    let run = store
        .get_latest_run(RunKind::Scan)
        .expect("Query failed")
        .expect("Scan run recorded");
    assert_eq!(run.status, RunStatus::Failed);
}

#[tokio::test]
async fn test_empty_page_ends_scan() {
    let server = MockServer::start().await;
    mount_index_page(&server, 1, index_page(&server, &[3, 2, 1]), 1).await;
    mount_index_page(&server, 2, index_page(&server, &[]), 1).await;

    let crawler = crawler(&server);
    let mut store = store_with(&[]);

    let outcome = crawler.scan(&mut store).await.expect("Scan failed");

    assert_eq!(outcome.saved, 3);
    assert_eq!(outcome.pages_fetched, 2);
}

#[tokio::test]
async fn test_scan_persists_to_database_file() {
    let server = MockServer::start().await;
    mount_index_page(&server, 1, index_page(&server, &[2, 1]), 1).await;
    mount_index_page(&server, 2, index_page(&server, &[]), 1).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("kakuro.db");

    {
        let mut store = open_storage(&db_path, 1).expect("Failed to open database");
        let outcome = crawler(&server).scan(&mut store).await.expect("Scan failed");
        assert_eq!(outcome.saved, 2);
    }

    let reopened = open_storage(&db_path, 500).expect("Failed to reopen database");
    assert_eq!(
        reopened.query_existing_ids(1, 2).expect("Query failed"),
        HashSet::from([1, 2])
    );
}
