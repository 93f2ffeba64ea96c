// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content fetcher.
//!
//! Issues dependency downloads for the keys of a registry snapshot and
//! tracks them as one batch. Each download is awaited in its own task,
//! which releases the handle as soon as the terminal status is known. A
//! batch that is abandoned early (fail-fast, cancellation, dropped run)
//! detaches its tasks instead of aborting them, so every handle still
//! reaches a terminal status and is released exactly once.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::context::SyncContext;
use crate::error::{SyncError, SyncResult};
use crate::events::SyncEvent;
use crate::registry::{ContentKey, ContentLocatorRegistry};
use crate::store::{DownloadHandle, DownloadStatus, RemoteContentStore};

/// One issued download and the status it ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Key that was downloaded.
    pub key: ContentKey,
    /// Status at the time the task was collected.
    pub status: DownloadStatus,
}

/// Counters of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Downloads issued.
    pub issued: usize,
    /// Downloads that succeeded.
    pub succeeded: usize,
    /// Downloads that failed.
    pub failed: usize,
    /// Keys skipped because the store reported no size for them.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitPolicy {
    /// Return at the first failure.
    FailFast,
    /// Wait for every task, then report.
    All,
}

/// The downloads issued by one fetcher invocation.
struct DownloadBatch {
    tasks: JoinSet<DownloadTask>,
    report: BatchReport,
}

impl DownloadBatch {
    fn new() -> Self {
        DownloadBatch {
            tasks: JoinSet::new(),
            report: BatchReport::default(),
        }
    }

    fn issue(&mut self, ctx: &SyncContext, key: ContentKey, mut handle: Box<dyn DownloadHandle>) {
        ctx.emit(SyncEvent::DownloadIssued { key: key.clone() });
        let ctx = ctx.clone();
        self.tasks.spawn(async move {
            let status = handle.wait().await;
            handle.release();

            match &status {
                DownloadStatus::Failed(reason) => {
                    warn!(run_id = %ctx.run_id(), %key, %reason, "dependency download failed");
                    ctx.fail(format!("download of {key} failed: {reason}"));
                }
                _ => debug!(run_id = %ctx.run_id(), %key, "dependency download finished"),
            }
            ctx.emit(SyncEvent::DownloadFinished {
                key: key.clone(),
                status: status.clone(),
            });
            DownloadTask { key, status }
        });
        self.report.issued += 1;
    }

    async fn wait(mut self, ctx: &SyncContext, policy: WaitPolicy) -> SyncResult<BatchReport> {
        let mut first_failed: Option<ContentKey> = None;

        while let Some(joined) = self.tasks.join_next().await {
            let failed_key = match joined {
                Ok(DownloadTask {
                    status: DownloadStatus::Failed(_),
                    key,
                }) => Some(key),
                Ok(_) => {
                    self.report.succeeded += 1;
                    None
                }
                Err(e) => {
                    ctx.fail(format!("download task aborted: {e}"));
                    Some(ContentKey::from("<aborted task>"))
                }
            };

            if let Some(key) = failed_key {
                self.report.failed += 1;
                if policy == WaitPolicy::FailFast {
                    return Err(SyncError::DownloadFailure {
                        key,
                        failed: self.report.failed,
                        issued: self.report.issued,
                    });
                }
                first_failed.get_or_insert(key);
            }
        }

        match first_failed {
            Some(key) => Err(SyncError::DownloadFailure {
                key,
                failed: self.report.failed,
                issued: self.report.issued,
            }),
            None => Ok(self.report),
        }
    }
}

impl Drop for DownloadBatch {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            debug!(remaining = self.tasks.len(), "detaching in-flight downloads");
        }
        self.tasks.detach_all();
    }
}

/// Downloads content dependencies for the keys of a registry.
pub struct ContentFetcher {
    store: Arc<dyn RemoteContentStore>,
}

impl ContentFetcher {
    /// Creates a fetcher over `store`.
    pub fn new(store: Arc<dyn RemoteContentStore>) -> Self {
        ContentFetcher { store }
    }

    /// Downloads every key of every locator, without size checks.
    ///
    /// Fail-fast: the first failed download ends the call. Downloads still
    /// in flight at that point keep running in the background.
    pub async fn bootstrap(
        &self,
        ctx: &SyncContext,
        registry: &ContentLocatorRegistry,
    ) -> SyncResult<BatchReport> {
        info!(
            run_id = %ctx.run_id(),
            locators = registry.locator_count(),
            keys = registry.key_count(),
            "loading initial content"
        );

        let mut batch = DownloadBatch::new();
        for key in registry.keys() {
            let handle = self.store.download_dependencies(key);
            batch.issue(ctx, key.clone(), handle);
        }
        batch.wait(ctx, WaitPolicy::FailFast).await
    }

    /// Downloads the keys the store reports a size for.
    ///
    /// A size query failure ends the call immediately. Otherwise the batch
    /// is awaited until every download is terminal; a failed download sets
    /// the cancellation signal but leaves its siblings running.
    pub async fn incremental(
        &self,
        ctx: &SyncContext,
        registry: &ContentLocatorRegistry,
    ) -> SyncResult<BatchReport> {
        info!(run_id = %ctx.run_id(), keys = registry.key_count(), "checking content for updates");

        let mut batch = DownloadBatch::new();
        for key in registry.keys() {
            if ctx.cancel().is_set() {
                info!(run_id = %ctx.run_id(), "download cancelled");
                return Err(SyncError::OperationCancelled);
            }

            let size = tokio::select! {
                biased;
                _ = ctx.cancel().cancelled() => return Err(SyncError::OperationCancelled),
                size = self.store.get_download_size(key) => size,
            };

            match size {
                Err(source) => {
                    let err = SyncError::DownloadSizeQueryFailure {
                        key: key.clone(),
                        source,
                    };
                    warn!(run_id = %ctx.run_id(), error = %err, "check failed, verify network state");
                    ctx.fail(err.to_string());
                    return Err(err);
                }
                Ok(None) => {
                    debug!(run_id = %ctx.run_id(), %key, "no download size reported, skipping");
                    batch.report.skipped += 1;
                }
                // Any reported size counts as "needs download", zero included.
                Ok(Some(bytes)) => {
                    debug!(run_id = %ctx.run_id(), %key, bytes, "downloading updated content");
                    let handle = self.store.download_dependencies(key);
                    batch.issue(ctx, key.clone(), handle);
                }
            }
        }
        batch.wait(ctx, WaitPolicy::All).await
    }
}
