// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for catalog diff and apply

use std::sync::Arc;
use std::time::Duration;

use contentsync_core::mock::{CatalogOp, MockCatalogStore};
use contentsync_core::{
    CatalogId, CatalogSynchronizer, CatalogUpdateSet, LocatorId, LocatorMetadata, MemoryFlagStore,
    SyncContext, SyncError, SyncEvent,
};

use super::support::{registry, Harness};

fn ctx() -> SyncContext {
    SyncContext::new(Arc::new(MemoryFlagStore::new()))
}

#[tokio::test]
async fn test_diff_is_idempotent() {
    let store = Arc::new(MockCatalogStore::new().with_updates(["catA", "catB"]));
    let sync = CatalogSynchronizer::new(store.clone());
    let ctx = ctx();

    let first = sync.diff(&ctx).await.unwrap();
    let second = sync.diff(&ctx).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert!(first.contains(&CatalogId::from("catA")));
    assert_eq!(store.calls(CatalogOp::UpdateCatalogs), 0);
}

#[tokio::test]
async fn test_diff_does_not_touch_registry() {
    let installed = registry(&[("L1", "catA", &["a"])]);
    let sync = CatalogSynchronizer::new(Arc::new(MockCatalogStore::new().with_updates(["catA"])));
    let ctx = ctx().with_registry(installed.clone());

    sync.diff(&ctx).await.unwrap();

    assert_eq!(*ctx.registry().snapshot(), installed);
}

#[tokio::test]
async fn test_diff_emits_update_count() {
    let h = Harness::first_run(
        MockCatalogStore::new().with_updates(["a", "b", "c"]),
        contentsync_core::mock::MockContentStore::new(),
    );
    let (ctx, log) = h.recording_context();

    CatalogSynchronizer::new(h.catalogs.clone())
        .diff(&ctx)
        .await
        .unwrap();

    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[SyncEvent::CatalogUpdatesFound { count: 3 }]
    );
}

#[tokio::test]
async fn test_apply_empty_is_noop() {
    let installed = registry(&[("L1", "catA", &["a"])]);
    let store = Arc::new(MockCatalogStore::new());
    let sync = CatalogSynchronizer::new(store.clone());
    let ctx = ctx().with_registry(installed.clone());
    let before = ctx.registry().snapshot();

    sync.apply(&ctx, &CatalogUpdateSet::new()).await.unwrap();

    assert!(Arc::ptr_eq(&before, &ctx.registry().snapshot()));
    assert_eq!(store.calls(CatalogOp::UpdateCatalogs), 0);
    assert_eq!(store.calls(CatalogOp::CommitCatalogs), 0);
}

#[tokio::test]
async fn test_apply_replaces_locators_of_updated_catalogs_only() {
    let installed = registry(&[
        ("L1", "catA", &["a1"]),
        ("L2", "catA", &["a2"]),
        ("L3", "catB", &["b1"]),
    ]);
    let store = Arc::new(
        MockCatalogStore::new().with_update_result(vec![LocatorMetadata::new("L4", "catA", ["a4"])]),
    );
    let sync = CatalogSynchronizer::new(store.clone());
    let ctx = ctx().with_registry(installed);

    let updates: CatalogUpdateSet = ["catA"].into_iter().collect();
    sync.apply(&ctx, &updates).await.unwrap();

    let next = ctx.registry().snapshot();
    let locators: Vec<&LocatorId> = next.locators().collect();
    assert_eq!(locators, vec![&LocatorId::from("L3"), &LocatorId::from("L4")]);
    assert_eq!(store.updated_ids().len(), 1);
    assert!(store.updated_ids()[0].contains(&CatalogId::from("catA")));
    assert_eq!(store.calls(CatalogOp::CommitCatalogs), 1);
}

#[tokio::test]
async fn test_apply_failure_names_catalogs_and_keeps_registry() {
    let installed = registry(&[("L1", "catA", &["a"])]);
    let store = Arc::new(MockCatalogStore::new().failing(CatalogOp::UpdateCatalogs));
    let sync = CatalogSynchronizer::new(store);
    let ctx = ctx().with_registry(installed.clone());

    let updates: CatalogUpdateSet = ["catA", "catB"].into_iter().collect();
    let err = sync.apply(&ctx, &updates).await.unwrap_err();

    match err {
        SyncError::CatalogApplyFailure { catalogs, .. } => {
            assert_eq!(catalogs, vec![CatalogId::from("catA"), CatalogId::from("catB")]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(*ctx.registry().snapshot(), installed);
}

#[tokio::test(start_paused = true)]
async fn test_apply_cancelled_in_flight_never_commits() {
    let installed = registry(&[("L1", "catA", &["a"])]);
    let store = Arc::new(
        MockCatalogStore::new()
            .with_update_result(vec![LocatorMetadata::new("L1", "catA", ["b"])])
            .with_update_delay(Duration::from_secs(2)),
    );
    let sync = CatalogSynchronizer::new(store.clone());
    let ctx = ctx().with_registry(installed.clone());

    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.fail("shutdown");
    });
    let updates: CatalogUpdateSet = ["catA"].into_iter().collect();
    let err = sync.apply(&ctx, &updates).await.unwrap_err();

    assert!(matches!(err, SyncError::OperationCancelled));
    assert_eq!(store.calls(CatalogOp::UpdateCatalogs), 1);
    assert_eq!(store.calls(CatalogOp::CommitCatalogs), 0);
    assert_eq!(*ctx.registry().snapshot(), installed);
}

#[tokio::test]
async fn test_commit_failure_is_apply_failure() {
    let installed = registry(&[("L1", "catA", &["a"])]);
    let store = Arc::new(
        MockCatalogStore::new()
            .with_update_result(vec![LocatorMetadata::new("L1", "catA", ["b"])])
            .failing(CatalogOp::CommitCatalogs),
    );
    let sync = CatalogSynchronizer::new(store);
    let ctx = ctx().with_registry(installed.clone());

    let updates: CatalogUpdateSet = ["catA"].into_iter().collect();
    let err = sync.apply(&ctx, &updates).await.unwrap_err();

    assert!(matches!(err, SyncError::CatalogApplyFailure { .. }));
    assert_eq!(*ctx.registry().snapshot(), installed);
}
