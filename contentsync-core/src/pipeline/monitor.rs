// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Progress monitor.
//!
//! Watches the cancellation signal for the lifetime of a run and exposes
//! the "await completion" operation. Both waits are notifications rather
//! than sleep loops, so cancellation is observed as soon as it is set.

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::context::{CancellationSignal, ProgressTracker, SyncContext};
use crate::state::RunOutcome;

/// Background watcher that ends the run's progress on cancellation.
pub struct ProgressMonitor {
    cancel: CancellationSignal,
    progress: ProgressTracker,
}

impl ProgressMonitor {
    /// Creates a monitor for the run owning `ctx`.
    pub fn new(ctx: &SyncContext) -> Self {
        ProgressMonitor {
            cancel: ctx.cancel().clone(),
            progress: ctx.progress().clone(),
        }
    }

    /// Runs until the progress is done or the signal is observed.
    pub async fn watch(self) {
        tokio::select! {
            biased;
            _ = self.progress.wait_done() => {
                debug!("progress finished, monitor exiting");
            }
            _ = self.cancel.cancelled() => {
                self.progress.mark_done();
                error!(reason = self.cancel.reason().unwrap_or("none recorded"), "task cancelled");
            }
        }
    }

    /// Spawns [`ProgressMonitor::watch`] on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.watch())
    }
}

/// Waits until the run is done, then sets the cancellation signal so that
/// anything still in flight winds down.
///
/// Returns `Cancelled` if the signal was already set when the run finished.
pub async fn await_completion(cancel: &CancellationSignal, progress: &ProgressTracker) -> RunOutcome {
    progress.wait_done().await;
    let outcome = if cancel.is_set() {
        RunOutcome::Cancelled
    } else {
        RunOutcome::Clean
    };
    cancel.cancel();
    outcome
}
