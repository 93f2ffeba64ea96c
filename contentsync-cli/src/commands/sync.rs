// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync Command
//!
//! Runs the startup pipeline once and maps its outcome to an exit code.

use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use contentsync_core::{
    BypassPipeline, CallbackHandler, EventDispatcher, HttpProbeTransport, HttpRemoteStore,
    Orchestrator, RunOutcome, SqliteFlagStore, SyncConfig, SyncContext, SyncEvent, SyncPipeline,
};
use tracing::{debug, info};

use crate::display;

/// Exit code of a run that ended through cancellation.
pub const EXIT_CANCELLED: u8 = 1;

fn log_event(event: SyncEvent) {
    match event {
        SyncEvent::PhaseChanged { phase } => info!(%phase, "phase"),
        SyncEvent::ConnectivityResolved { status } => info!(?status, "connectivity"),
        SyncEvent::CatalogUpdatesFound { count } => info!(count, "catalog updates"),
        SyncEvent::DownloadIssued { key } => debug!(%key, "download issued"),
        SyncEvent::DownloadFinished { key, status } => debug!(%key, ?status, "download finished"),
        SyncEvent::Cancelled { reason } => info!(%reason, "run cancelled"),
    }
}

/// Runs one synchronization.
pub async fn run(config: &SyncConfig, local_mode: bool) -> Result<ExitCode> {
    fs::create_dir_all(&config.storage_path).with_context(|| {
        format!(
            "failed to create data directory {}",
            config.storage_path.display()
        )
    })?;
    let flags = Arc::new(
        SqliteFlagStore::open(config.flag_db_path()).context("failed to open flag database")?,
    );

    let pipeline: Arc<dyn SyncPipeline> = if local_mode {
        Arc::new(BypassPipeline)
    } else {
        let store = Arc::new(HttpRemoteStore::new(config).context("failed to set up content store")?);
        let probe = Arc::new(HttpProbeTransport::new(config).context("failed to set up probe")?);
        Arc::new(Orchestrator::from_config(config, store.clone(), store, probe))
    };

    let mut events = EventDispatcher::new();
    events.add_handler(Arc::new(CallbackHandler::new(log_event)));
    let ctx = SyncContext::new(flags)
        .with_flag_key(config.flag_key.clone())
        .with_events(Arc::new(events));

    let handle = pipeline.launch(ctx);
    let outcome = handle.await_completion().await;
    let reason = handle.reason();
    let result = handle.join().await;

    let code = match outcome {
        RunOutcome::Clean => {
            match result {
                Ok(Some(report)) => display::success(&format!(
                    "Content up to date ({} catalogs updated, {} downloads)",
                    report.catalogs_updated, report.downloads_succeeded
                )),
                _ => display::success("Content up to date"),
            }
            ExitCode::SUCCESS
        }
        RunOutcome::Bypassed => {
            display::info("Local mode: content sync bypassed");
            ExitCode::SUCCESS
        }
        RunOutcome::Cancelled => {
            let detail = match result {
                Err(e) => e.to_string(),
                Ok(_) => reason.unwrap_or_else(|| "cancelled".to_string()),
            };
            display::warning(&format!("Content sync cancelled: {detail}"));
            ExitCode::from(EXIT_CANCELLED)
        }
    };
    Ok(code)
}
