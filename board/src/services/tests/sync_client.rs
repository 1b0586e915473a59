//! Tests for the sync client: validation gate, retry bound, load fallbacks

use std::time::Duration;

use mockall::predicate::eq;
use serde_json::json;

use shared::{InvestorStatus, NoticeLevel, ProjectId};
use super::common::{channel_notifier, drain, investor, sample_records, test_project, test_retry};
use crate::error::BoardError;
use crate::services::SyncClient;
use crate::traits::{MockRemoteStore, RemoteSync};

#[tokio::test]
async fn test_save_rejects_incomplete_records_without_network() {
    let mut store = MockRemoteStore::new();
    store.expect_put_records().never();
    let (notifier, mut notices) = channel_notifier();
    let client = SyncClient::new(store, notifier, test_retry());

    let mut records = sample_records();
    records[1].name.clear();

    assert!(!client.save(&records, &test_project()).await);
    assert!(!client.save(&[], &test_project()).await);

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|notice| notice.is_error()));
}

#[tokio::test]
async fn test_save_writes_full_array_once() {
    let records = sample_records();
    let expected_body = serde_json::to_string(&records).unwrap();

    let mut store = MockRemoteStore::new();
    store
        .expect_put_records()
        .withf(move |project, body| project.as_str() == "acme-board" && *body == expected_body)
        .times(1)
        .returning(|_, _| Ok(()));
    let (notifier, mut notices) = channel_notifier();
    let client = SyncClient::new(store, notifier, test_retry());

    assert!(client.save(&records, &test_project()).await);

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
}

#[tokio::test(start_paused = true)]
async fn test_save_retry_bound_with_linear_backoff() {
    let mut store = MockRemoteStore::new();
    store
        .expect_put_records()
        .times(3)
        .returning(|_, _| Err(BoardError::transport("connection refused")));
    let (notifier, mut notices) = channel_notifier();
    let client = SyncClient::new(store, notifier, test_retry());

    let started = tokio::time::Instant::now();
    assert!(!client.save(&sample_records(), &test_project()).await);

    // 1000ms after the first failure, 2000ms after the second
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(3000), "waited {elapsed:?}");
    assert!(elapsed < Duration::from_millis(3010), "waited {elapsed:?}");

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1, "one notice per failed attempt chain");
    assert!(notices[0].is_error());
    assert!(notices[0].description.as_deref().unwrap().contains("3 attempts"));
}

#[tokio::test(start_paused = true)]
async fn test_save_recovers_on_second_attempt() {
    let mut store = MockRemoteStore::new();
    let mut calls = 0;
    store.expect_put_records().times(2).returning(move |_, _| {
        calls += 1;
        if calls == 1 {
            Err(BoardError::HttpStatus { status: 502, body: "bad gateway".to_string() })
        } else {
            Ok(())
        }
    });
    let (notifier, _notices) = channel_notifier();
    let client = SyncClient::new(store, notifier, test_retry());

    assert!(client.save(&sample_records(), &test_project()).await);
}

#[tokio::test]
async fn test_load_data_field_payload() {
    let mut store = MockRemoteStore::new();
    store
        .expect_fetch_payload()
        .with(eq(test_project()))
        .times(1)
        .returning(|_| Ok(json!({ "data": [{ "id": "1", "investmentMin": { "value": "500" } }] })));
    let (notifier, mut notices) = channel_notifier();
    let client = SyncClient::new(store, notifier, test_retry());

    let records = client.load(&test_project()).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.as_str(), "1");
    assert_eq!(records[0].investment_min, Some(500.0));
    assert_eq!(records[0].investment_max, None);
    assert_eq!(records[0].name, "Unnamed");
    assert_eq!(records[0].status, InvestorStatus::first());
    assert!(!records[0].created_at.is_empty());
    assert_eq!(drain(&mut notices)[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_load_unrecognised_shape_is_empty_with_notice() {
    let mut store = MockRemoteStore::new();
    store
        .expect_fetch_payload()
        .times(1)
        .returning(|_| Ok(json!({ "status": "ok", "count": 0 })));
    let (notifier, mut notices) = channel_notifier();
    let client = SyncClient::new(store, notifier, test_retry());

    assert!(client.load(&test_project()).await.is_empty());

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
}

#[tokio::test(start_paused = true)]
async fn test_load_gives_up_after_retries() {
    let mut store = MockRemoteStore::new();
    store
        .expect_fetch_payload()
        .times(3)
        .returning(|_| Err(BoardError::transport("timeout")));
    let (notifier, mut notices) = channel_notifier();
    let client = SyncClient::new(store, notifier, test_retry());

    assert!(client.load(&test_project()).await.is_empty());
    assert!(drain(&mut notices)[0].is_error());
}

#[tokio::test]
async fn test_format_errors_are_not_retried() {
    let mut store = MockRemoteStore::new();
    store
        .expect_fetch_payload()
        .times(1)
        .returning(|_| Err(BoardError::format("response is not JSON")));
    let (notifier, mut notices) = channel_notifier();
    let client = SyncClient::new(store, notifier, test_retry());

    assert!(client.load(&test_project()).await.is_empty());
    assert_eq!(drain(&mut notices)[0].level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_track_update_passes_note() {
    let mut store = MockRemoteStore::new();
    store
        .expect_put_metadata()
        .withf(|project, note, _| project.as_str() == "acme-board" && note == "Nuovo investitore: Delta")
        .times(1)
        .returning(|_, _, _| Ok(()));
    store
        .expect_put_metadata()
        .withf(|_, note, _| note == "fails")
        .returning(|_, _, _| Err(BoardError::transport("down")));
    let (notifier, mut notices) = channel_notifier();
    let client = SyncClient::new(store, notifier, test_retry());

    assert!(client.track_update("Nuovo investitore: Delta", &test_project()).await);
    assert!(!client.track_update("fails", &test_project()).await);
    assert!(drain(&mut notices).is_empty(), "metadata failures stay in the log");
}

#[tokio::test]
async fn test_blank_project_short_circuits() {
    let mut store = MockRemoteStore::new();
    store.expect_put_records().never();
    store.expect_fetch_payload().never();
    let (notifier, mut notices) = channel_notifier();
    let client = SyncClient::new(store, notifier, test_retry());

    let blank: ProjectId = serde_json::from_str("\"  \"").unwrap();
    let records = vec![investor("1", "Alpha", InvestorStatus::ToContact)];

    assert!(!client.save(&records, &blank).await);
    assert!(client.load(&blank).await.is_empty());
    assert_eq!(drain(&mut notices).len(), 2);
}
