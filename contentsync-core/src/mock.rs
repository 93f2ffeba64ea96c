// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Stores
//!
//! Scriptable implementations of the collaborator traits for testing.
//!
//! # Example
//!
//! ```ignore
//! use contentsync_core::mock::{MockCatalogStore, MockContentStore, SizeReply};
//!
//! let catalogs = MockCatalogStore::new()
//!     .with_updates(["base"])
//!     .with_update_result(vec![LocatorMetadata::new("L1", "base", ["k1", "k2"])]);
//! let content = MockContentStore::new().with_size("k2", SizeReply::Absent);
//!
//! // ... run the pipeline ...
//!
//! assert_eq!(content.attempts(), vec![ContentKey::from("k1")]);
//! assert_eq!(content.release_count(), 1);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::registry::{CatalogId, ContentKey, ContentLocatorRegistry, LocatorMetadata};
use crate::store::{
    DownloadHandle, DownloadStatus, ProbeResponse, ProbeTransport, RemoteCatalogStore,
    RemoteContentStore,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Operations of [`RemoteCatalogStore`], for failure injection and call
/// counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogOp {
    /// `initialize`
    Initialize,
    /// `clear_resource_locators`
    ClearResourceLocators,
    /// `load_local_catalog`
    LoadLocalCatalog,
    /// `check_for_updates`
    CheckForUpdates,
    /// `update_catalogs`
    UpdateCatalogs,
    /// `commit_catalogs`
    CommitCatalogs,
}

/// Mock catalog store.
#[derive(Debug, Default)]
pub struct MockCatalogStore {
    installed: Mutex<ContentLocatorRegistry>,
    local: Mutex<ContentLocatorRegistry>,
    updates: Mutex<BTreeSet<CatalogId>>,
    update_result: Mutex<Vec<LocatorMetadata>>,
    update_delay: Option<Duration>,
    failures: Mutex<HashSet<CatalogOp>>,
    calls: Mutex<HashMap<CatalogOp, usize>>,
    updated_ids: Mutex<Vec<BTreeSet<CatalogId>>>,
    loaded_locations: Mutex<Vec<String>>,
}

impl MockCatalogStore {
    /// Creates a store with no catalogs and no updates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locators returned by `initialize`.
    pub fn with_installed(self, registry: ContentLocatorRegistry) -> Self {
        *lock(&self.installed) = registry;
        self
    }

    /// Registry returned by `load_local_catalog`.
    pub fn with_local(self, registry: ContentLocatorRegistry) -> Self {
        *lock(&self.local) = registry;
        self
    }

    /// Catalogs reported by `check_for_updates`.
    pub fn with_updates<I: Into<CatalogId>>(self, ids: impl IntoIterator<Item = I>) -> Self {
        *lock(&self.updates) = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Locators returned by `update_catalogs`.
    pub fn with_update_result(self, locators: Vec<LocatorMetadata>) -> Self {
        *lock(&self.update_result) = locators;
        self
    }

    /// Delays `update_catalogs` by `delay`.
    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = Some(delay);
        self
    }

    /// Makes `op` fail.
    pub fn failing(self, op: CatalogOp) -> Self {
        lock(&self.failures).insert(op);
        self
    }

    /// Number of calls made to `op`.
    pub fn calls(&self, op: CatalogOp) -> usize {
        lock(&self.calls).get(&op).copied().unwrap_or(0)
    }

    /// Arguments of every `update_catalogs` call.
    pub fn updated_ids(&self) -> Vec<BTreeSet<CatalogId>> {
        lock(&self.updated_ids).clone()
    }

    /// Arguments of every `load_local_catalog` call.
    pub fn loaded_locations(&self) -> Vec<String> {
        lock(&self.loaded_locations).clone()
    }

    fn record(&self, op: CatalogOp) -> Result<(), StoreError> {
        *lock(&self.calls).entry(op).or_insert(0) += 1;
        if lock(&self.failures).contains(&op) {
            return Err(StoreError::Other(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteCatalogStore for MockCatalogStore {
    async fn initialize(&self) -> Result<ContentLocatorRegistry, StoreError> {
        self.record(CatalogOp::Initialize)?;
        Ok(lock(&self.installed).clone())
    }

    fn clear_resource_locators(&self) -> Result<(), StoreError> {
        self.record(CatalogOp::ClearResourceLocators)?;
        *lock(&self.installed) = ContentLocatorRegistry::new();
        Ok(())
    }

    async fn load_local_catalog(
        &self,
        location: &str,
    ) -> Result<ContentLocatorRegistry, StoreError> {
        lock(&self.loaded_locations).push(location.to_string());
        self.record(CatalogOp::LoadLocalCatalog)?;
        Ok(lock(&self.local).clone())
    }

    async fn check_for_updates(&self) -> Result<BTreeSet<CatalogId>, StoreError> {
        self.record(CatalogOp::CheckForUpdates)?;
        Ok(lock(&self.updates).clone())
    }

    async fn update_catalogs(
        &self,
        ids: &BTreeSet<CatalogId>,
    ) -> Result<Vec<LocatorMetadata>, StoreError> {
        lock(&self.updated_ids).push(ids.clone());
        if let Some(delay) = self.update_delay {
            tokio::time::sleep(delay).await;
        }
        self.record(CatalogOp::UpdateCatalogs)?;
        Ok(lock(&self.update_result).clone())
    }

    fn commit_catalogs(&self) -> Result<(), StoreError> {
        self.record(CatalogOp::CommitCatalogs)
    }
}

/// Scripted reply to a download size query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeReply {
    /// `Ok(Some(n))`
    Bytes(u64),
    /// `Ok(None)`
    Absent,
    /// `Err(..)` with the given message
    Error(String),
}

/// Mock content store.
///
/// Every key reports one byte to download and succeeds immediately unless
/// scripted otherwise.
#[derive(Debug, Default)]
pub struct MockContentStore {
    sizes: Mutex<HashMap<ContentKey, SizeReply>>,
    failures: Mutex<HashMap<ContentKey, String>>,
    delays: Mutex<HashMap<ContentKey, Duration>>,
    size_delay: Option<Duration>,
    size_queries: Mutex<Vec<ContentKey>>,
    attempts: Mutex<Vec<ContentKey>>,
    releases: Arc<AtomicUsize>,
}

impl MockContentStore {
    /// Creates a store where every download succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the size reply for `key`.
    pub fn with_size(self, key: impl Into<ContentKey>, reply: SizeReply) -> Self {
        lock(&self.sizes).insert(key.into(), reply);
        self
    }

    /// Makes the download of `key` fail with `reason`.
    pub fn with_failure(self, key: impl Into<ContentKey>, reason: impl Into<String>) -> Self {
        lock(&self.failures).insert(key.into(), reason.into());
        self
    }

    /// Delays the terminal status of `key` by `delay`.
    pub fn with_delay(self, key: impl Into<ContentKey>, delay: Duration) -> Self {
        lock(&self.delays).insert(key.into(), delay);
        self
    }

    /// Delays every size query by `delay`.
    pub fn with_size_delay(mut self, delay: Duration) -> Self {
        self.size_delay = Some(delay);
        self
    }

    /// Keys passed to `download_dependencies`, in call order.
    pub fn attempts(&self) -> Vec<ContentKey> {
        lock(&self.attempts).clone()
    }

    /// Keys passed to `get_download_size`, in call order.
    pub fn size_queries(&self) -> Vec<ContentKey> {
        lock(&self.size_queries).clone()
    }

    /// Number of handles released so far.
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteContentStore for MockContentStore {
    async fn get_download_size(&self, key: &ContentKey) -> Result<Option<u64>, StoreError> {
        lock(&self.size_queries).push(key.clone());
        if let Some(delay) = self.size_delay {
            tokio::time::sleep(delay).await;
        }

        let reply = lock(&self.sizes)
            .get(key)
            .cloned()
            .unwrap_or(SizeReply::Bytes(1));
        match reply {
            SizeReply::Bytes(n) => Ok(Some(n)),
            SizeReply::Absent => Ok(None),
            SizeReply::Error(message) => Err(StoreError::Other(message)),
        }
    }

    fn download_dependencies(&self, key: &ContentKey) -> Box<dyn DownloadHandle> {
        lock(&self.attempts).push(key.clone());

        let outcome = match lock(&self.failures).get(key) {
            Some(reason) => DownloadStatus::Failed(reason.clone()),
            None => DownloadStatus::Succeeded,
        };
        let delay = lock(&self.delays).get(key).copied();

        Box::new(MockDownloadHandle {
            outcome,
            delay,
            releases: Arc::clone(&self.releases),
        })
    }
}

/// Download that resolves to a scripted status.
#[derive(Debug)]
pub struct MockDownloadHandle {
    outcome: DownloadStatus,
    delay: Option<Duration>,
    releases: Arc<AtomicUsize>,
}

#[async_trait]
impl DownloadHandle for MockDownloadHandle {
    async fn wait(&mut self) -> DownloadStatus {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }

    fn release(self: Box<Self>) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scripted reply of a [`MockProbeTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeReply {
    /// Respond with the given status code.
    Status(u16),
    /// Fail with a transport error.
    Error(String),
    /// Never respond.
    Hang,
}

/// Mock probe transport.
#[derive(Debug)]
pub struct MockProbeTransport {
    reply: ProbeReply,
    calls: AtomicUsize,
}

impl MockProbeTransport {
    /// Transport answering every request with `reply`.
    pub fn new(reply: ProbeReply) -> Self {
        MockProbeTransport {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    /// Transport answering `200`.
    pub fn reachable() -> Self {
        Self::new(ProbeReply::Status(200))
    }

    /// Number of requests made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProbeTransport for MockProbeTransport {
    async fn head(&self, _endpoint: &str) -> Result<ProbeResponse, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            ProbeReply::Status(status) => Ok(ProbeResponse { status: *status }),
            ProbeReply::Error(message) => Err(StoreError::Other(message.clone())),
            ProbeReply::Hang => std::future::pending().await,
        }
    }
}
