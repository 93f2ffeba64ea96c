// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for run events

use contentsync_core::mock::{MockCatalogStore, MockContentStore, MockProbeTransport};
use contentsync_core::{ConnectionStatus, ContentKey, DownloadStatus, LocatorMetadata, SyncEvent};

use super::support::Harness;

#[tokio::test]
async fn test_incremental_run_emits_probe_diff_and_download_events() {
    let catalogs = MockCatalogStore::new()
        .with_updates(["base"])
        .with_update_result(vec![LocatorMetadata::new("L1", "base", ["a"])]);
    let h = Harness::later_run(catalogs, MockContentStore::new(), MockProbeTransport::reachable());
    let (ctx, log) = h.recording_context();

    h.orchestrator().run(&ctx).await.unwrap();

    let events = log.lock().unwrap().clone();
    let key = ContentKey::from("a");
    assert!(events.contains(&SyncEvent::ConnectivityResolved {
        status: ConnectionStatus::Reachable
    }));
    assert!(events.contains(&SyncEvent::CatalogUpdatesFound { count: 1 }));
    assert!(events.contains(&SyncEvent::DownloadIssued { key: key.clone() }));
    assert!(events.contains(&SyncEvent::DownloadFinished {
        key,
        status: DownloadStatus::Succeeded
    }));
}

#[tokio::test]
async fn test_cancelled_run_emits_reason() {
    let h = Harness::later_run(
        MockCatalogStore::new(),
        MockContentStore::new(),
        MockProbeTransport::new(contentsync_core::mock::ProbeReply::Status(502)),
    );
    let (ctx, log) = h.recording_context();

    assert!(h.orchestrator().run(&ctx).await.is_err());

    let events = log.lock().unwrap().clone();
    assert_eq!(
        events.last(),
        Some(&SyncEvent::Cancelled {
            reason: "endpoint https://probe.test/ unreachable".to_string()
        })
    );
}
