// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the content fetcher
//!
//! Scenarios:
//! - Size query results decide which keys are downloaded
//! - Every handle is released exactly once
//! - Cancellation between keys stops issuing downloads

use std::sync::Arc;
use std::time::Duration;

use contentsync_core::mock::{MockContentStore, SizeReply};
use contentsync_core::{ContentFetcher, ContentKey, MemoryFlagStore, SyncContext, SyncError};

use super::support::registry;

fn ctx() -> SyncContext {
    SyncContext::new(Arc::new(MemoryFlagStore::new()))
}

#[tokio::test]
async fn test_incremental_zero_size_still_downloads() {
    let store = Arc::new(
        MockContentStore::new()
            .with_size("zero", SizeReply::Bytes(0))
            .with_size("big", SizeReply::Bytes(4096))
            .with_size("absent", SizeReply::Absent),
    );
    let fetcher = ContentFetcher::new(store.clone());
    let reg = registry(&[("L1", "base", &["zero", "big", "absent"])]);

    let report = fetcher.incremental(&ctx(), &reg).await.unwrap();

    assert_eq!(report.issued, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.succeeded, 2);
    assert_eq!(
        store.attempts(),
        vec![ContentKey::from("zero"), ContentKey::from("big")]
    );
    assert_eq!(store.size_queries().len(), 3);
}

#[tokio::test]
async fn test_incremental_all_absent_issues_nothing() {
    let store = Arc::new(
        MockContentStore::new()
            .with_size("a", SizeReply::Absent)
            .with_size("b", SizeReply::Absent),
    );
    let fetcher = ContentFetcher::new(store.clone());
    let reg = registry(&[("L1", "base", &["a", "b"])]);

    let report = fetcher.incremental(&ctx(), &reg).await.unwrap();

    assert_eq!(report.issued, 0);
    assert!(store.attempts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_incremental_failure_sets_signal_without_cancelling_siblings() {
    let store = Arc::new(
        MockContentStore::new()
            .with_failure("b", "404")
            .with_delay("b", Duration::from_millis(10))
            .with_delay("c", Duration::from_secs(1)),
    );
    let fetcher = ContentFetcher::new(store.clone());
    let reg = registry(&[("L1", "base", &["a", "b", "c"])]);
    let ctx = ctx();

    let err = fetcher.incremental(&ctx, &reg).await.unwrap_err();

    assert!(matches!(err, SyncError::DownloadFailure { failed: 1, .. }));
    assert!(ctx.cancel().is_set());
    assert!(ctx.cancel().reason().unwrap().contains("404"));
    assert_eq!(store.release_count(), 3);
}

#[tokio::test]
async fn test_incremental_stops_when_already_cancelled() {
    let store = Arc::new(MockContentStore::new());
    let fetcher = ContentFetcher::new(store.clone());
    let reg = registry(&[("L1", "base", &["a"])]);
    let ctx = ctx();
    ctx.fail("host shutdown");

    let err = fetcher.incremental(&ctx, &reg).await.unwrap_err();

    assert!(matches!(err, SyncError::OperationCancelled));
    assert!(store.size_queries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_incremental_cancel_during_size_query_issues_nothing_more() {
    let store = Arc::new(MockContentStore::new().with_size_delay(Duration::from_secs(5)));
    let fetcher = ContentFetcher::new(store.clone());
    let reg = registry(&[("L1", "base", &["a", "b"])]);
    let ctx = ctx();

    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.fail("shutdown");
    });
    let err = fetcher.incremental(&ctx, &reg).await.unwrap_err();

    assert!(matches!(err, SyncError::OperationCancelled));
    assert_eq!(store.size_queries(), vec![ContentKey::from("a")]);
    assert!(store.attempts().is_empty());
}

#[tokio::test]
async fn test_bootstrap_downloads_duplicate_keys_per_locator() {
    let store = Arc::new(MockContentStore::new());
    let fetcher = ContentFetcher::new(store.clone());
    let reg = registry(&[("L1", "base", &["shared", "a"]), ("L2", "base", &["shared"])]);

    let report = fetcher.bootstrap(&ctx(), &reg).await.unwrap();

    assert_eq!(report.issued, 3);
    assert_eq!(store.release_count(), 3);
}

#[tokio::test]
async fn test_bootstrap_empty_registry_succeeds() {
    let store = Arc::new(MockContentStore::new());
    let fetcher = ContentFetcher::new(store.clone());

    let report = fetcher
        .bootstrap(&ctx(), &registry(&[]))
        .await
        .unwrap();

    assert_eq!(report.issued, 0);
}

#[tokio::test(start_paused = true)]
async fn test_released_once_even_when_signal_set_before_resolution() {
    let store = Arc::new(
        MockContentStore::new()
            .with_failure("fast", "boom")
            .with_delay("slow", Duration::from_secs(3)),
    );
    let fetcher = ContentFetcher::new(store.clone());
    let reg = registry(&[("L1", "base", &["fast", "slow"])]);
    let ctx = ctx();

    assert!(fetcher.bootstrap(&ctx, &reg).await.is_err());
    assert!(ctx.cancel().is_set());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(store.release_count(), 2);
}
