// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Startup Synchronization Pipeline
//!
//! # Architecture
//!
//! - **ConnectivityProbe**: one reachability check per incremental run
//! - **ProgressMonitor**: watches the cancellation signal, ends progress
//! - **CatalogSynchronizer**: catalog diff and all-or-nothing apply
//! - **ContentFetcher**: bootstrap and incremental download batches
//! - **Orchestrator**: the phase state machine composing the above
//!
//! A host picks a [`SyncPipeline`] at composition time: the
//! [`Orchestrator`] for real runs or the [`BypassPipeline`] for local
//! development modes where no content should be fetched.
//!
//! # Example
//!
//! ```ignore
//! use contentsync_core::pipeline::{Orchestrator, SyncPipeline};
//!
//! let pipeline = Arc::new(Orchestrator::from_config(&config, store.clone(), store, probe));
//! let handle = pipeline.launch(SyncContext::new(flags));
//! match handle.await_completion().await {
//!     RunOutcome::Clean => start_game(),
//!     _ => show_offline_notice(),
//! }
//! ```

mod catalog;
mod fetcher;
mod monitor;
mod orchestrator;
mod probe;

pub use catalog::{CatalogSynchronizer, CatalogUpdateSet};
pub use fetcher::{BatchReport, ContentFetcher, DownloadTask};
pub use monitor::{await_completion, ProgressMonitor};
pub use orchestrator::Orchestrator;
pub use probe::ConnectivityProbe;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::context::SyncContext;
use crate::error::{SyncError, SyncResult};
use crate::state::{Phase, RunOutcome, RunReport};

/// A startup pipeline strategy.
pub trait SyncPipeline: Send + Sync {
    /// Starts the pipeline on the current tokio runtime.
    fn launch(self: Arc<Self>, ctx: SyncContext) -> SyncHandle;
}

/// Handle to a launched run.
pub struct SyncHandle {
    ctx: SyncContext,
    task: Option<JoinHandle<SyncResult<RunReport>>>,
    monitor: Option<JoinHandle<()>>,
}

impl SyncHandle {
    pub(crate) fn new(
        ctx: SyncContext,
        task: Option<JoinHandle<SyncResult<RunReport>>>,
        monitor: Option<JoinHandle<()>>,
    ) -> Self {
        SyncHandle { ctx, task, monitor }
    }

    /// Waits until the run is logically finished, then sets the
    /// cancellation signal to wind down anything still in flight.
    pub async fn await_completion(&self) -> RunOutcome {
        if self.task.is_none() {
            self.ctx.progress().wait_done().await;
            return RunOutcome::Bypassed;
        }
        await_completion(self.ctx.cancel(), self.ctx.progress()).await
    }

    /// Receiver notified on every phase change.
    pub fn phase(&self) -> watch::Receiver<Phase> {
        self.ctx.subscribe_phase()
    }

    /// Cancels the run from the outside.
    pub fn cancel(&self) {
        self.ctx.fail("cancelled by host");
    }

    /// First fatal reason recorded for this run.
    pub fn reason(&self) -> Option<String> {
        self.ctx.cancel().reason().map(str::to_string)
    }

    /// Context of the run.
    pub fn context(&self) -> &SyncContext {
        &self.ctx
    }

    /// Waits for the run task and returns its result.
    ///
    /// `Ok(None)` means the pipeline was bypassed.
    pub async fn join(mut self) -> SyncResult<Option<RunReport>> {
        let Some(task) = self.task.take() else {
            return Ok(None);
        };
        let result = match task.await {
            Ok(result) => result.map(Some),
            Err(e) => {
                warn!(run_id = %self.ctx.run_id(), error = %e, "sync task did not finish");
                Err(SyncError::OperationCancelled)
            }
        };
        if let Some(monitor) = self.monitor.take() {
            if let Err(e) = monitor.await {
                warn!(run_id = %self.ctx.run_id(), error = %e, "progress monitor did not finish");
            }
        }
        result
    }
}

/// No-op pipeline for local development modes.
///
/// Ends the run immediately without touching any store or flag.
#[derive(Debug, Default)]
pub struct BypassPipeline;

impl SyncPipeline for BypassPipeline {
    fn launch(self: Arc<Self>, ctx: SyncContext) -> SyncHandle {
        info!(run_id = %ctx.run_id(), "local mode, content sync bypassed");
        ctx.cancel().cancel();
        ctx.progress().mark_done();
        ctx.enter(Phase::Cancelled);
        SyncHandle::new(ctx, None, None)
    }
}
