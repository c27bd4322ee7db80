//! Enrichment tests against a mock puzzle site

use crate::common::{
    crawler, detail_page, detail_path, image_path, index_page, mount_index_page, mount_puzzle,
    png, worker,
};
use kakurizer::enrich::{run_enrichment, EnrichmentFailure};
use kakurizer::record::{CandidateRecord, Difficulty};
use kakurizer::storage::{RunKind, SqliteStorage, Store};
use kakurizer::FetchError;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_scan_then_enrich_end_to_end() {
    let server = MockServer::start().await;
    mount_index_page(&server, 1, index_page(&server, &[12, 11]), 1).await;
    mount_index_page(&server, 2, index_page(&server, &[]), 1).await;
    mount_puzzle(&server, 12).await;
    mount_puzzle(&server, 11).await;

    let mut store = SqliteStorage::new_in_memory().expect("Failed to open store");
    crawler(&server)
        .scan(&mut store)
        .await
        .expect("Scan failed");

    let outcome = worker(2)
        .enrich_pending(&mut store)
        .await
        .expect("Enrichment failed");

    assert_eq!(outcome.attempted, 2);
    assert_eq!(outcome.enriched, 2);
    assert_eq!(outcome.failed(), 0);
    assert!(store.fetch_unenriched().expect("Query failed").is_empty());
    assert_eq!(store.count_enriched().expect("Count failed"), 2);
}

#[tokio::test]
async fn test_enriched_fields_are_stored() {
    let server = MockServer::start().await;
    mount_puzzle(&server, 5).await;

    let mut store = SqliteStorage::new_in_memory().expect("Failed to open store");
    store
        .insert_new(&[CandidateRecord {
            id: 5,
            published_at_millis: 1_513_900_898_000,
            detail_url: format!("{}{}", server.uri(), detail_path(5)),
            difficulty: Difficulty::Medium,
        }])
        .expect("Insert failed");
    let (handle, record) = store.fetch_unenriched().expect("Query failed").remove(0);

    worker(1)
        .enrich(&mut store, handle, &record)
        .await
        .expect("Enrichment failed");

    let stored = store.get_puzzle(handle).expect("Puzzle missing");
    let image = stored.image.expect("Image fields missing");
    assert_eq!(
        image.image_url,
        format!("{}{}?width=600&quality=85", server.uri(), image_path(5))
    );
    assert_eq!((image.width, image.height), (36, 36));
    assert_eq!(image.format, "PNG");
    assert_eq!(image.image_bytes, png(36, 36));
    assert_eq!(stored.record, record);
}

#[tokio::test]
async fn test_failures_do_not_abort_other_puzzles() {
    let server = MockServer::start().await;
    mount_index_page(&server, 1, index_page(&server, &[3, 2, 1]), 1).await;
    mount_index_page(&server, 2, index_page(&server, &[]), 1).await;
    mount_puzzle(&server, 3).await;

    // Puzzle 2: detail page exists but the image is not an image
    Mock::given(method("GET"))
        .and(path(detail_path(2)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_page(&format!("{}{}", server.uri(), image_path(2)))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(image_path(2)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89".to_vec()))
        .mount(&server)
        .await;

    // Puzzle 1: detail page is missing
    Mock::given(method("GET"))
        .and(path(detail_path(1)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut store = SqliteStorage::new_in_memory().expect("Failed to open store");
    crawler(&server)
        .scan(&mut store)
        .await
        .expect("Scan failed");

    let outcome = run_enrichment(&worker(3), &mut store, "hash")
        .await
        .expect("Enrichment run failed");

    assert_eq!(outcome.enriched, 1);
    assert_eq!(outcome.failed(), 2);

    let mut failed_ids: Vec<i64> = outcome.failures.iter().map(|e| e.id).collect();
    failed_ids.sort();
    assert_eq!(failed_ids, vec![1, 2]);

    for failure in &outcome.failures {
        match failure.id {
            1 => assert!(matches!(
                failure.source,
                EnrichmentFailure::Fetch(FetchError::Status { status: 404, .. })
            )),
            2 => assert!(matches!(
                failure.source,
                EnrichmentFailure::UnreadableImage(_)
            )),
            other => panic!("unexpected failure for puzzle {}", other),
        }
        assert!(failure.detail_url.ends_with(&detail_path(failure.id)));
    }

    // Failed puzzles stay pending for the next pass
    let pending: Vec<i64> = store
        .fetch_unenriched()
        .expect("Query failed")
        .into_iter()
        .map(|(_, record)| record.id)
        .collect();
    assert_eq!(pending, vec![2, 1]);

    let run = store
        .get_latest_run(RunKind::Enrichment)
        .expect("Query failed")
        .expect("Enrichment run recorded");
    assert_eq!(run.processed, 1);
    assert_eq!(run.failed, 2);
}

#[tokio::test]
async fn test_site_relative_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/kakuro-7-easy"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("/media/7.png")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/7.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png(20, 10)))
        .mount(&server)
        .await;

    let site_base = Url::parse(&server.uri()).expect("Mock server URI");
    let worker = worker(1).with_site_base(site_base);
    let record = CandidateRecord {
        id: 7,
        published_at_millis: 0,
        detail_url: "/kakuro-7-easy".to_string(),
        difficulty: Difficulty::Low,
    };

    let enriched = worker.prepare(&record).await.expect("Enrichment failed");

    assert_eq!(
        enriched.image.image_url,
        format!("{}/media/7.png?width=600&quality=85", server.uri())
    );
    assert_eq!((enriched.image.width, enriched.image.height), (20, 10));
}
