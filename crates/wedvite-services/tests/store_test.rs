//! Staging, commit and fallback behaviour across both tiers.
//!
//! Run with: `cargo test -p wedvite-services --test store_test`

mod helpers;

use std::sync::Arc;

use helpers::fixtures::{aged_record, ids, photo_data_uri, record_with_media, PHOTO_BASE64};
use helpers::{setup_test_stores, setup_with_tiers, test_config, TruncatingTier};
use wedvite_core::{AppError, CommitOutcome, InvitationRecord, SaveOutcome};
use wedvite_storage::MemoryTier;

#[tokio::test]
async fn test_saves_then_commit_keep_order_and_media() {
    let stores = setup_test_stores();
    let p = &stores.persistence;

    for id in ["A", "B", "C"] {
        let outcome = p.persist(record_with_media(id)).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Staged);
    }
    let committed = p.commit().await.unwrap();
    assert_eq!(committed, CommitOutcome { staged: 3, changed: 3 });

    let records = p.load_all().await.unwrap();
    assert_eq!(ids(&records), vec!["A", "B", "C"]);
    for record in &records {
        assert_eq!(record.cover_photo.as_deref(), Some(photo_data_uri().as_str()));
        assert_eq!(
            record.gallery.as_deref(),
            Some(&[photo_data_uri(), photo_data_uri()][..])
        );
        assert!(record
            .background_music
            .as_deref()
            .is_some_and(|m| m.starts_with("data:audio/mpeg;base64,")));
    }

    let raw = stores.durable_raw().await.unwrap();
    assert!(!raw.contains("data:"));
    assert!(raw.contains(&format!(r#""coverPhoto":"{}""#, PHOTO_BASE64)));
    assert!(stores.transient_raw().await.is_none());
}

#[tokio::test]
async fn test_ids_stay_unique() {
    let stores = setup_test_stores();
    let p = &stores.persistence;

    p.persist(InvitationRecord::new("A")).await.unwrap();
    p.persist(InvitationRecord::new("B")).await.unwrap();
    p.commit().await.unwrap();

    p.persist(InvitationRecord {
        venue: Some("Garden".to_string()),
        ..InvitationRecord::new("A")
    })
    .await
    .unwrap();
    p.persist(InvitationRecord::new("A")).await.unwrap();
    p.commit().await.unwrap();
    p.durable().upsert(InvitationRecord::new("B")).await.unwrap();

    let records = p.load_all().await.unwrap();
    assert_eq!(ids(&records), vec!["A", "B"]);

    p.durable().upsert(InvitationRecord::new("C")).await.unwrap();
    assert_eq!(p.load_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_fields_survive_a_round_trip() {
    let stores = setup_test_stores();
    let p = &stores.persistence;

    let record: InvitationRecord = serde_json::from_str(
        r#"{"id":"A","groomName":"Budi","dressCode":"batik","rsvp":{"open":true}}"#,
    )
    .unwrap();
    p.durable().upsert(record.clone()).await.unwrap();

    let loaded = p.durable().get("A").await.unwrap().unwrap();
    assert_eq!(loaded, record);
    assert_eq!(loaded.extra["dressCode"], "batik");
}

#[tokio::test]
async fn test_commit_failure_leaves_transient_intact() {
    // The durable tier refuses anything over 10 bytes.
    let stores = setup_with_tiers(
        Arc::new(MemoryTier::with_quota(10)),
        Arc::new(MemoryTier::new()),
        &test_config(1 << 20, 1 << 20),
    );
    let p = &stores.persistence;

    p.persist(aged_record("A", 1)).await.unwrap();
    p.persist(aged_record("B", 1)).await.unwrap();
    let staged_before = stores.transient_raw().await.unwrap();

    let err = p.commit().await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)), "got {:?}", err);

    assert_eq!(stores.transient_raw().await.unwrap(), staged_before);
    assert_eq!(ids(&p.transient().load_all().await.unwrap()), vec!["A", "B"]);
    assert!(stores.durable_raw().await.is_none());
}

#[tokio::test]
async fn test_commit_integrity_failure_leaves_transient_intact() {
    let stores = setup_with_tiers(
        Arc::new(TruncatingTier::new(8)),
        Arc::new(MemoryTier::new()),
        &test_config(1 << 20, 1 << 20),
    );
    let p = &stores.persistence;
    p.persist(record_with_media("A")).await.unwrap();

    let err = p.commit().await.unwrap_err();
    match err {
        AppError::IntegrityCheckFailed {
            written_bytes,
            read_bytes,
            ..
        } => {
            assert_eq!(read_bytes, 8);
            assert!(written_bytes > read_bytes);
        }
        other => panic!("expected IntegrityCheckFailed, got {:?}", other),
    }
    assert_eq!(p.transient().load_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_transient_failure_falls_back_to_durable() {
    let stores = setup_with_tiers(
        Arc::new(MemoryTier::new()),
        Arc::new(MemoryTier::with_quota(5)),
        &test_config(1 << 20, 1 << 20),
    );
    let p = &stores.persistence;

    let outcome = p.persist(record_with_media("A")).await.unwrap();
    assert_eq!(outcome, SaveOutcome::FellBackToDurable);
    assert!(stores.transient_raw().await.is_none());

    let durable = p.load_all().await.unwrap();
    assert_eq!(ids(&durable), vec!["A"]);
    assert_eq!(durable[0].cover_photo.as_deref(), Some(photo_data_uri().as_str()));
}

#[tokio::test]
async fn test_both_tiers_failing_reports_fallback_failure() {
    let stores = setup_with_tiers(
        Arc::new(MemoryTier::with_quota(5)),
        Arc::new(MemoryTier::with_quota(5)),
        &test_config(1 << 20, 1 << 20),
    );

    let err = stores
        .persistence
        .persist(InvitationRecord::new("A"))
        .await
        .unwrap_err();
    match err {
        AppError::FallbackFailed { transient, durable } => {
            assert!(transient.contains("Quota exceeded"));
            assert!(matches!(*durable, AppError::Storage(_)));
        }
        other => panic!("expected FallbackFailed, got {:?}", other),
    }
}
