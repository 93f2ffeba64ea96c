// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event System
//!
//! Callbacks for synchronization progress. Hosts use these to drive their
//! own progress UI.

use std::sync::Arc;

use crate::registry::ContentKey;
use crate::state::{ConnectionStatus, Phase};
use crate::store::DownloadStatus;

/// Events emitted during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The state machine moved to a new phase.
    PhaseChanged {
        /// The new phase.
        phase: Phase,
    },

    /// The reachability probe resolved.
    ConnectivityResolved {
        /// Probe result.
        status: ConnectionStatus,
    },

    /// The catalog diff finished.
    CatalogUpdatesFound {
        /// Number of catalogs needing an update.
        count: usize,
    },

    /// A dependency download was issued.
    DownloadIssued {
        /// Key being downloaded.
        key: ContentKey,
    },

    /// A dependency download reached a terminal status.
    DownloadFinished {
        /// Key that was downloaded.
        key: ContentKey,
        /// Terminal status.
        status: DownloadStatus,
    },

    /// The run was cancelled.
    Cancelled {
        /// First fatal reason recorded.
        reason: String,
    },
}

/// Event handler trait.
///
/// Implement this trait to receive sync events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: SyncEvent);
}

/// Simple callback-based event handler.
pub struct CallbackHandler<F>
where
    F: Fn(SyncEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(SyncEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(SyncEvent) + Send + Sync,
{
    fn on_event(&self, event: SyncEvent) {
        (self.callback)(event);
    }
}

/// Event dispatcher for managing multiple handlers.
#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    pub fn new() -> Self {
        EventDispatcher {
            handlers: Vec::new(),
        }
    }

    /// Adds an event handler.
    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatches an event to all handlers.
    pub fn dispatch(&self, event: SyncEvent) {
        for handler in &self.handlers {
            handler.on_event(event.clone());
        }
    }
}
