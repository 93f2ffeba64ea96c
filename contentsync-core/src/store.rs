// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Collaborator Traits
//!
//! Boundaries between the pipeline and the resource library it drives.
//! Implementations decide how catalogs and bytes actually travel; the
//! pipeline only decides when and in which order they are asked for.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::registry::{CatalogId, ContentKey, ContentLocatorRegistry, LocatorMetadata};

/// Terminal or pending state of a single dependency download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    /// Not resolved yet.
    Pending,
    /// Bytes are in the local cache.
    Succeeded,
    /// The download failed with the given reason.
    Failed(String),
}

impl DownloadStatus {
    /// Returns true for `Succeeded` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DownloadStatus::Pending)
    }
}

/// An in-flight dependency download.
///
/// The owner waits for a terminal status and then hands the handle back
/// through [`DownloadHandle::release`], which consumes it.
#[async_trait]
pub trait DownloadHandle: Send {
    /// Waits until the download reaches a terminal status.
    async fn wait(&mut self) -> DownloadStatus;

    /// Releases the resources held by the download.
    fn release(self: Box<Self>);
}

/// Versioned catalog metadata, local and remote.
#[async_trait]
pub trait RemoteCatalogStore: Send + Sync {
    /// Prepares the store for use and returns the locators it already has
    /// installed (empty on a cleared store).
    async fn initialize(&self) -> Result<ContentLocatorRegistry, StoreError>;

    /// Drops any locally cached locator state.
    fn clear_resource_locators(&self) -> Result<(), StoreError>;

    /// Loads the catalog bundled with the client.
    async fn load_local_catalog(&self, location: &str)
        -> Result<ContentLocatorRegistry, StoreError>;

    /// Catalogs whose remote hash differs from the local one.
    async fn check_for_updates(&self) -> Result<BTreeSet<CatalogId>, StoreError>;

    /// Fetches updated locator metadata for every given catalog.
    ///
    /// The update is staged only; nothing becomes installed until
    /// [`RemoteCatalogStore::commit_catalogs`] is called.
    async fn update_catalogs(
        &self,
        ids: &BTreeSet<CatalogId>,
    ) -> Result<Vec<LocatorMetadata>, StoreError>;

    /// Installs the update staged by the last `update_catalogs` call.
    ///
    /// A staged update that is never committed leaves the installed
    /// catalogs untouched, so the next diff reports the same catalogs.
    fn commit_catalogs(&self) -> Result<(), StoreError>;
}

/// Content bytes addressed by key.
#[async_trait]
pub trait RemoteContentStore: Send + Sync {
    /// Bytes still needed for a key. `Ok(None)` means the store has no size
    /// for this key at all.
    async fn get_download_size(&self, key: &ContentKey) -> Result<Option<u64>, StoreError>;

    /// Starts downloading every dependency of a key.
    fn download_dependencies(&self, key: &ContentKey) -> Box<dyn DownloadHandle>;
}

/// Response to a reachability request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    /// Status code returned by the endpoint.
    pub status: u16,
}

impl ProbeResponse {
    /// Returns true for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport for the header-only reachability request.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Issues one HEAD-style request to `endpoint`.
    async fn head(&self, endpoint: &str) -> Result<ProbeResponse, StoreError>;
}
