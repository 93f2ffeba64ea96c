// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared fixtures for the sync tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use contentsync_core::mock::{MockCatalogStore, MockContentStore, MockProbeTransport};
use contentsync_core::{
    CallbackHandler, ContentLocatorRegistry, EventDispatcher, LocatorMetadata, MemoryFlagStore,
    Orchestrator, SyncContext, SyncEvent, BOOTSTRAP_FLAG_KEY,
};

pub const PROBE_ENDPOINT: &str = "https://probe.test/";
pub const LOCAL_CATALOG: &str = "bundled/catalog.json";

/// Builds a registry from `(locator, catalog, keys)` triples.
pub fn registry(locators: &[(&str, &str, &[&str])]) -> ContentLocatorRegistry {
    ContentLocatorRegistry::from_locators(
        locators
            .iter()
            .map(|(locator, catalog, keys)| LocatorMetadata::new(*locator, *catalog, keys.iter().copied())),
    )
}

/// Mocks wired into one orchestrator.
pub struct Harness {
    pub catalogs: Arc<MockCatalogStore>,
    pub content: Arc<MockContentStore>,
    pub probe: Arc<MockProbeTransport>,
    pub flags: Arc<MemoryFlagStore>,
}

impl Harness {
    /// First run: flag absent.
    pub fn first_run(catalogs: MockCatalogStore, content: MockContentStore) -> Self {
        Self::with_flags(catalogs, content, MockProbeTransport::reachable(), MemoryFlagStore::new())
    }

    /// Later run: flag set, probe as given.
    pub fn later_run(
        catalogs: MockCatalogStore,
        content: MockContentStore,
        probe: MockProbeTransport,
    ) -> Self {
        Self::with_flags(
            catalogs,
            content,
            probe,
            MemoryFlagStore::with_value(BOOTSTRAP_FLAG_KEY, 1),
        )
    }

    pub fn with_flags(
        catalogs: MockCatalogStore,
        content: MockContentStore,
        probe: MockProbeTransport,
        flags: MemoryFlagStore,
    ) -> Self {
        Harness {
            catalogs: Arc::new(catalogs),
            content: Arc::new(content),
            probe: Arc::new(probe),
            flags: Arc::new(flags),
        }
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            self.catalogs.clone(),
            self.content.clone(),
            self.probe.clone(),
            PROBE_ENDPOINT,
            LOCAL_CATALOG,
        )
    }

    pub fn context(&self) -> SyncContext {
        SyncContext::new(self.flags.clone())
    }

    /// Context whose events are appended to the returned log.
    pub fn recording_context(&self) -> (SyncContext, Arc<Mutex<Vec<SyncEvent>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_handler(Arc::new(CallbackHandler::new(move |event| {
            sink.lock().unwrap().push(event);
        })));
        (self.context().with_events(Arc::new(dispatcher)), log)
    }

    pub fn flag(&self) -> Option<i64> {
        use contentsync_core::PersistentFlagStore;
        self.flags.get(BOOTSTRAP_FLAG_KEY).unwrap()
    }
}
