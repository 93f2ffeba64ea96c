// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Run Context
//!
//! Everything a phase needs is carried by [`SyncContext`] and passed
//! explicitly: the flag store, the cancellation signal, the registry
//! snapshot, progress state and the event dispatcher. Nothing here is
//! global; two runs never share a context.

use std::sync::{Arc, OnceLock};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::events::{EventDispatcher, SyncEvent};
use crate::flags::{PersistentFlagStore, BOOTSTRAP_FLAG_KEY};
use crate::registry::{ContentLocatorRegistry, RegistryHandle};
use crate::state::{Phase, ProgressState};

/// Set-once cancellation flag shared by all operations of a run.
///
/// Cloning shares the underlying signal.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<String>>,
}

impl CancellationSignal {
    /// Creates an unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the signal because of a fatal condition.
    ///
    /// Only the first reason is kept. Returns true if this call was the one
    /// that recorded it.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        let first = self.reason.set(reason.into()).is_ok();
        self.token.cancel();
        first
    }

    /// Sets the signal without recording a reason.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once the signal has been set.
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the signal is set.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// The first fatal reason, if any was recorded.
    pub fn reason(&self) -> Option<&str> {
        self.reason.get().map(String::as_str)
    }
}

/// Running/Done state with change notification.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    tx: Arc<watch::Sender<ProgressState>>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    /// Creates a tracker in `Running`.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressState::Running);
        ProgressTracker { tx: Arc::new(tx) }
    }

    /// Marks the run as done. Idempotent.
    pub fn mark_done(&self) {
        self.tx.send_replace(ProgressState::Done);
    }

    /// Current state.
    pub fn state(&self) -> ProgressState {
        *self.tx.borrow()
    }

    /// Completes once the state is `Done`.
    pub async fn wait_done(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|state| *state == ProgressState::Done).await;
    }
}

/// Per-run state threaded through every phase call.
#[derive(Clone)]
pub struct SyncContext {
    run_id: Uuid,
    flags: Arc<dyn PersistentFlagStore>,
    flag_key: String,
    cancel: CancellationSignal,
    registry: RegistryHandle,
    progress: ProgressTracker,
    phase: Arc<watch::Sender<Phase>>,
    events: Arc<EventDispatcher>,
}

impl SyncContext {
    /// Creates a context with an empty registry and no event handlers.
    pub fn new(flags: Arc<dyn PersistentFlagStore>) -> Self {
        let (phase, _rx) = watch::channel(Phase::Start);
        SyncContext {
            run_id: Uuid::new_v4(),
            flags,
            flag_key: BOOTSTRAP_FLAG_KEY.to_string(),
            cancel: CancellationSignal::new(),
            registry: RegistryHandle::default(),
            progress: ProgressTracker::new(),
            phase: Arc::new(phase),
            events: Arc::new(EventDispatcher::new()),
        }
    }

    /// Uses a different key for the bootstrap flag.
    pub fn with_flag_key(mut self, key: impl Into<String>) -> Self {
        self.flag_key = key.into();
        self
    }

    /// Dispatches events to the given dispatcher.
    pub fn with_events(mut self, events: Arc<EventDispatcher>) -> Self {
        self.events = events;
        self
    }

    /// Starts from an existing registry instead of an empty one.
    pub fn with_registry(self, registry: ContentLocatorRegistry) -> Self {
        self.registry.replace(registry);
        self
    }

    /// Identifier of this run, attached to every log line.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Flag store holding the bootstrap flag.
    pub fn flags(&self) -> &dyn PersistentFlagStore {
        self.flags.as_ref()
    }

    /// Key of the bootstrap flag.
    pub fn flag_key(&self) -> &str {
        &self.flag_key
    }

    /// Cancellation signal of this run.
    pub fn cancel(&self) -> &CancellationSignal {
        &self.cancel
    }

    /// Registry holder of this run.
    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    /// Progress state of this run.
    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Receiver notified on every phase change.
    pub fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Moves to `phase` and notifies observers.
    pub fn enter(&self, phase: Phase) {
        let previous = self.phase.send_replace(phase);
        if previous != phase {
            debug!(run_id = %self.run_id, from = %previous, to = %phase, "phase transition");
            self.emit(SyncEvent::PhaseChanged { phase });
        }
    }

    /// Dispatches an event to the registered handlers.
    pub fn emit(&self, event: SyncEvent) {
        self.events.dispatch(event);
    }

    /// Records a fatal condition on the cancellation signal.
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        if self.cancel.fail(reason.clone()) {
            warn!(run_id = %self.run_id, %reason, "cancellation signalled");
        }
    }
}
