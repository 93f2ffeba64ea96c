// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Run state enums shared by the pipeline components.

use std::fmt;

/// Phase of the startup state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, not launched yet.
    Start,
    /// Reading the bootstrap flag and initializing the catalog store.
    Init,
    /// First-run full download.
    Bootstrap,
    /// Probe, catalog diff/apply and changed-content download.
    Incremental,
    /// Finished cleanly.
    Completed,
    /// Ended by a fatal condition or external cancellation.
    Cancelled,
}

impl Phase {
    /// Returns true for `Completed` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Cancelled)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Start => "start",
            Phase::Init => "init",
            Phase::Bootstrap => "bootstrap",
            Phase::Incremental => "incremental",
            Phase::Completed => "completed",
            Phase::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Reachability of the remote store, determined once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Not probed yet.
    Unknown,
    /// The probe got a success response.
    Reachable,
    /// The probe failed or was cancelled.
    Unreachable,
}

/// Whether the run is still going, as seen by the progress monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    /// Phases still executing.
    Running,
    /// A phase terminated the run (success or cancellation).
    Done,
}

/// Value returned by "await completion".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run reached `Completed`.
    Clean,
    /// The run ended through the cancellation signal.
    Cancelled,
    /// The pipeline was bypassed (local/editor mode).
    Bypassed,
}

impl RunOutcome {
    /// Returns true unless the run was cancelled.
    pub fn is_success(self) -> bool {
        !matches!(self, RunOutcome::Cancelled)
    }
}

/// Branch taken by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunBranch {
    /// First-run full download.
    Bootstrap,
    /// Later run.
    Incremental,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Branch the run took.
    pub branch: RunBranch,
    /// Number of catalogs that needed an update (always 0 for bootstrap).
    pub catalogs_updated: usize,
    /// Downloads issued.
    pub downloads_issued: usize,
    /// Downloads that succeeded.
    pub downloads_succeeded: usize,
}
