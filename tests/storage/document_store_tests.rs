//! DocumentStore interface tests.
//!
//! These tests verify the contract of the DocumentStore trait.
//! Each storage implementation should run these tests. Every test uses its
//! own key so they can share one database.

use quire::model::{
    AuditEntry, DocumentPatch, SiteConfig, SiteDocument, Testimonial, TestimonialInput,
    TestimonialSource, TestimonialStatus, ViewStats,
};
use quire::storage::{DocumentStore, StorageError, WritePrecondition};

fn document_with_testimonial(author: &str) -> SiteDocument {
    let mut document = SiteDocument::default();
    document.testimonials.push(Testimonial::from_input(
        TestimonialInput::new(author, "Loved the projects"),
        TestimonialSource::External,
    ));
    document
        .content
        .insert("courses".to_string(), serde_json::json!([{"slug": "rust-101"}]));
    document
}

fn stats(total: u64) -> ViewStats {
    ViewStats {
        total_views: total,
        ..ViewStats::default()
    }
}

// =============================================================================
// DocumentStore::get / create_if_absent tests
// =============================================================================

pub async fn test_get_missing<S: DocumentStore>(store: &S) {
    let result = store.get("test_missing").await.expect("get should succeed");
    assert!(result.is_none(), "missing document should be None");
}

pub async fn test_create_if_absent<S: DocumentStore>(store: &S) {
    let key = "test_create";
    let document = document_with_testimonial("Ada");

    assert!(store.create_if_absent(key, document.clone()).await.unwrap());
    assert!(
        !store
            .create_if_absent(key, SiteDocument::default())
            .await
            .unwrap(),
        "second create must not overwrite"
    );

    let stored = store.get(key).await.unwrap().expect("document should exist");
    assert_eq!(stored.version, 1);
    assert_eq!(stored.document, document, "document should round-trip");
}

// =============================================================================
// DocumentStore::write tests
// =============================================================================

pub async fn test_write_bumps_version<S: DocumentStore>(store: &S) {
    let key = "test_write_version";
    store.create_if_absent(key, SiteDocument::default()).await.unwrap();

    let v2 = store
        .write(key, DocumentPatch::default().with_stats(stats(1)), WritePrecondition::Version(1))
        .await
        .unwrap();
    let v3 = store
        .write(key, DocumentPatch::default().with_stats(stats(2)), WritePrecondition::Unconditional)
        .await
        .unwrap();

    assert_eq!((v2, v3), (2, 3));
    let stored = store.get(key).await.unwrap().unwrap();
    assert_eq!(stored.version, 3);
    assert_eq!(stored.document.stats.total_views, 2);
}

pub async fn test_write_preserves_other_sections<S: DocumentStore>(store: &S) {
    let key = "test_write_sections";
    let original = document_with_testimonial("Grace");
    store.create_if_absent(key, original.clone()).await.unwrap();

    let config = SiteConfig {
        show_typing_animation: true,
        ..SiteConfig::default()
    };
    store
        .write(key, DocumentPatch::default().with_config(config), WritePrecondition::Version(1))
        .await
        .unwrap();

    let stored = store.get(key).await.unwrap().unwrap().document;
    assert!(stored.config.show_typing_animation);
    assert_eq!(stored.testimonials, original.testimonials);
    assert_eq!(stored.content, original.content);
    assert_eq!(stored.stats, original.stats);
}

pub async fn test_write_stale_version_conflicts<S: DocumentStore>(store: &S) {
    let key = "test_write_conflict";
    store.create_if_absent(key, SiteDocument::default()).await.unwrap();
    store
        .write(key, DocumentPatch::default().with_stats(stats(1)), WritePrecondition::Version(1))
        .await
        .unwrap();

    let err = store
        .write(key, DocumentPatch::default().with_stats(stats(99)), WritePrecondition::Version(1))
        .await
        .expect_err("stale write should fail");

    assert!(
        matches!(err, StorageError::VersionConflict { expected: 1, actual: 2, .. }),
        "unexpected error: {err}"
    );
    let stored = store.get(key).await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.document.stats.total_views, 1, "stale write must not land");
}

pub async fn test_write_missing_document<S: DocumentStore>(store: &S) {
    for precondition in [WritePrecondition::Unconditional, WritePrecondition::Version(1)] {
        let err = store
            .write("test_write_missing", DocumentPatch::default().with_stats(stats(1)), precondition)
            .await
            .expect_err("write to missing document should fail");
        assert!(matches!(err, StorageError::NotFound { .. }), "unexpected error: {err}");
    }
}

pub async fn test_audit_log_round_trip_order<S: DocumentStore>(store: &S) {
    let key = "test_audit_order";
    store.create_if_absent(key, SiteDocument::default()).await.unwrap();

    let mut audit_logs = quire::model::AuditLog::new();
    audit_logs.record(AuditEntry::new("FIRST", "", "Admin"));
    audit_logs.record(AuditEntry::new("SECOND", "", "Admin"));
    store
        .write(key, DocumentPatch::default().with_audit_logs(audit_logs), WritePrecondition::Version(1))
        .await
        .unwrap();

    let stored = store.get(key).await.unwrap().unwrap().document;
    let actions: Vec<_> = stored.audit_logs.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, ["SECOND", "FIRST"], "newest entry first");
}

// =============================================================================
// DocumentStore::upsert tests
// =============================================================================

pub async fn test_upsert_creates_then_replaces<S: DocumentStore>(store: &S) {
    let key = "test_upsert";

    let v1 = store.upsert(key, document_with_testimonial("Ada")).await.unwrap();
    let v2 = store.upsert(key, SiteDocument::default()).await.unwrap();

    assert_eq!((v1, v2), (1, 2));
    let stored = store.get(key).await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.document, SiteDocument::default(), "upsert replaces everything");
}

// =============================================================================
// Submitted testimonial round-trip tests
// =============================================================================

pub async fn test_submitted_extras_read_back<S: DocumentStore>(store: &S) {
    let key = "test_submitted_extras";
    store.create_if_absent(key, SiteDocument::default()).await.unwrap();

    let input: TestimonialInput = serde_json::from_value(serde_json::json!({
        "author": "Eve",
        "content": "hi",
        "status": "approved",
        "source": "internal",
        "date": "1999-01-01T00:00:00Z",
        "course": "rust-101"
    }))
    .unwrap();
    let testimonial = Testimonial::from_input(input, TestimonialSource::External);

    store
        .write(
            key,
            DocumentPatch::default().with_testimonials(vec![testimonial.clone()]),
            WritePrecondition::Version(1),
        )
        .await
        .unwrap();

    let stored = store
        .get(key)
        .await
        .expect("document with submitted extras should decode")
        .unwrap();
    assert_eq!(stored.document.testimonials, vec![testimonial]);
    let read_back = &stored.document.testimonials[0];
    assert_eq!(read_back.status, TestimonialStatus::Pending);
    assert_eq!(read_back.source, TestimonialSource::External);
    assert_eq!(read_back.extra.get("course"), Some(&serde_json::json!("rust-101")));
}

/// Run all DocumentStore interface tests.
#[macro_export]
macro_rules! run_document_store_tests {
    ($store:expr) => {
        use $crate::storage::document_store_tests::*;

        test_get_missing($store).await;
        println!("  test_get_missing: PASSED");

        test_create_if_absent($store).await;
        println!("  test_create_if_absent: PASSED");

        test_write_bumps_version($store).await;
        println!("  test_write_bumps_version: PASSED");

        test_write_preserves_other_sections($store).await;
        println!("  test_write_preserves_other_sections: PASSED");

        test_write_stale_version_conflicts($store).await;
        println!("  test_write_stale_version_conflicts: PASSED");

        test_write_missing_document($store).await;
        println!("  test_write_missing_document: PASSED");

        test_audit_log_round_trip_order($store).await;
        println!("  test_audit_log_round_trip_order: PASSED");

        test_upsert_creates_then_replaces($store).await;
        println!("  test_upsert_creates_then_replaces: PASSED");

        test_submitted_extras_read_back($store).await;
        println!("  test_submitted_extras_read_back: PASSED");
    };
}
