// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Startup orchestrator.
//!
//! `Start → Init → {Bootstrap | Incremental} → {Completed | Cancelled}`.
//! This is the only component that decides control flow; the probe, the
//! synchronizer and the fetcher each perform one step and report back.

use std::sync::Arc;

use tracing::{error, info, info_span, Instrument};

use super::catalog::CatalogSynchronizer;
use super::fetcher::ContentFetcher;
use super::monitor::ProgressMonitor;
use super::probe::ConnectivityProbe;
use super::{SyncHandle, SyncPipeline};
use crate::config::SyncConfig;
use crate::context::SyncContext;
use crate::error::{SyncError, SyncResult};
use crate::events::SyncEvent;
use crate::flags::BootstrapFlag;
use crate::state::{ConnectionStatus, Phase, RunBranch, RunReport};
use crate::store::{ProbeTransport, RemoteCatalogStore, RemoteContentStore};

/// The startup synchronization pipeline.
pub struct Orchestrator {
    catalogs: Arc<dyn RemoteCatalogStore>,
    probe: ConnectivityProbe,
    synchronizer: CatalogSynchronizer,
    fetcher: ContentFetcher,
    local_catalog: String,
}

impl Orchestrator {
    /// Composes the pipeline.
    ///
    /// `local_catalog` is handed verbatim to
    /// [`RemoteCatalogStore::load_local_catalog`] on the bootstrap branch.
    pub fn new(
        catalogs: Arc<dyn RemoteCatalogStore>,
        content: Arc<dyn RemoteContentStore>,
        probe: Arc<dyn ProbeTransport>,
        probe_endpoint: impl Into<String>,
        local_catalog: impl Into<String>,
    ) -> Self {
        Orchestrator {
            synchronizer: CatalogSynchronizer::new(Arc::clone(&catalogs)),
            catalogs,
            probe: ConnectivityProbe::new(probe, probe_endpoint),
            fetcher: ContentFetcher::new(content),
            local_catalog: local_catalog.into(),
        }
    }

    /// Composes the pipeline with endpoints taken from `config`.
    pub fn from_config(
        config: &SyncConfig,
        catalogs: Arc<dyn RemoteCatalogStore>,
        content: Arc<dyn RemoteContentStore>,
        probe: Arc<dyn ProbeTransport>,
    ) -> Self {
        Self::new(
            catalogs,
            content,
            probe,
            config.probe_endpoint.clone(),
            config.local_catalog.clone(),
        )
    }

    /// Runs the state machine to a terminal phase.
    ///
    /// Every exit path marks progress as done: success moves to
    /// `Completed`; any error sets the cancellation signal and moves to
    /// `Cancelled`.
    pub async fn run(&self, ctx: &SyncContext) -> SyncResult<RunReport> {
        let result = self.run_phases(ctx).await;

        match &result {
            Ok(report) => {
                ctx.enter(Phase::Completed);
                ctx.progress().mark_done();
                info!(
                    run_id = %ctx.run_id(),
                    branch = ?report.branch,
                    catalogs = report.catalogs_updated,
                    downloads = report.downloads_issued,
                    "done"
                );
            }
            Err(err) => {
                ctx.fail(err.to_string());
                ctx.progress().mark_done();
                ctx.enter(Phase::Cancelled);
                let reason = ctx.cancel().reason().unwrap_or("cancelled").to_string();
                error!(run_id = %ctx.run_id(), kind = err.kind(), error = %err, "run cancelled");
                ctx.emit(SyncEvent::Cancelled { reason });
            }
        }
        result
    }

    async fn run_phases(&self, ctx: &SyncContext) -> SyncResult<RunReport> {
        ctx.enter(Phase::Init);
        let flag = BootstrapFlag::read(ctx.flags(), ctx.flag_key())
            .map_err(SyncError::FlagStoreFailure)?;

        if !flag.is_bootstrapped() {
            info!(run_id = %ctx.run_id(), "first run, clearing cached locators");
            self.catalogs
                .clear_resource_locators()
                .map_err(SyncError::StoreInitFailure)?;
        }

        let installed = self
            .catalogs
            .initialize()
            .await
            .map_err(SyncError::StoreInitFailure)?;
        ctx.registry().replace(installed);
        ensure_running(ctx)?;

        match flag {
            BootstrapFlag::NotBootstrapped => self.bootstrap(ctx).await,
            BootstrapFlag::Bootstrapped => self.incremental(ctx).await,
        }
    }

    async fn bootstrap(&self, ctx: &SyncContext) -> SyncResult<RunReport> {
        ctx.enter(Phase::Bootstrap);

        let registry = self
            .catalogs
            .load_local_catalog(&self.local_catalog)
            .await
            .map_err(SyncError::LocalCatalogFailure)?;
        info!(
            run_id = %ctx.run_id(),
            catalog = %self.local_catalog,
            "local catalog loaded, fetching initial content"
        );
        ctx.registry().replace(registry);

        let snapshot = ctx.registry().snapshot();
        let batch = self.fetcher.bootstrap(ctx, &snapshot).await?;
        ensure_running(ctx)?;

        BootstrapFlag::mark_bootstrapped(ctx.flags(), ctx.flag_key())
            .map_err(SyncError::FlagStoreFailure)?;
        info!(run_id = %ctx.run_id(), downloads = batch.issued, "bootstrap flag set");

        Ok(RunReport {
            branch: RunBranch::Bootstrap,
            catalogs_updated: 0,
            downloads_issued: batch.issued,
            downloads_succeeded: batch.succeeded,
        })
    }

    async fn incremental(&self, ctx: &SyncContext) -> SyncResult<RunReport> {
        ctx.enter(Phase::Incremental);

        if self.probe.check(ctx).await != ConnectionStatus::Reachable {
            return Err(SyncError::ConnectivityFailure(format!(
                "could not reach {}",
                self.probe.endpoint()
            )));
        }

        let updates = self.synchronizer.diff(ctx).await?;
        ensure_running(ctx)?;

        let mut report = RunReport {
            branch: RunBranch::Incremental,
            catalogs_updated: updates.len(),
            downloads_issued: 0,
            downloads_succeeded: 0,
        };
        if updates.is_empty() {
            info!(run_id = %ctx.run_id(), "catalogs up to date, no download phase");
            return Ok(report);
        }

        self.synchronizer.apply(ctx, &updates).await?;
        ensure_running(ctx)?;

        let snapshot = ctx.registry().snapshot();
        let batch = self.fetcher.incremental(ctx, &snapshot).await?;
        report.downloads_issued = batch.issued;
        report.downloads_succeeded = batch.succeeded;
        Ok(report)
    }
}

fn ensure_running(ctx: &SyncContext) -> SyncResult<()> {
    if ctx.cancel().is_set() {
        Err(SyncError::OperationCancelled)
    } else {
        Ok(())
    }
}

impl SyncPipeline for Orchestrator {
    fn launch(self: Arc<Self>, ctx: SyncContext) -> SyncHandle {
        let span = info_span!("sync_run", run_id = %ctx.run_id());
        let monitor = ProgressMonitor::new(&ctx).spawn();

        let run_ctx = ctx.clone();
        let task = tokio::spawn(async move { self.run(&run_ctx).await }.instrument(span));

        SyncHandle::new(ctx, Some(task), Some(monitor))
    }
}
