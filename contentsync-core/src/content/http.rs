// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! HTTP content store
//!
//! Reference implementation of [`RemoteCatalogStore`],
//! [`RemoteContentStore`] and [`ProbeTransport`] on top of reqwest:
//! - `GET {remote_url}/catalog.json` for the remote catalogs
//! - `GET {remote_url}/{path}` for content bytes
//! - `HEAD {endpoint}` for reachability
//!
//! Content is checked against the manifest checksum and size limit before
//! it lands in the [`DiskCache`].

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::cache::DiskCache;
use super::manifest::{CatalogManifest, ContentEntry};
use crate::config::SyncConfig;
use crate::error::StoreError;
use crate::registry::{CatalogId, ContentKey, ContentLocatorRegistry, LocatorMetadata};
use crate::store::{
    DownloadHandle, DownloadStatus, ProbeResponse, ProbeTransport, RemoteCatalogStore,
    RemoteContentStore,
};

/// Builds the HTTP client shared by the store and the probe.
pub fn build_client(config: &SyncConfig) -> Result<Client, StoreError> {
    let mut builder = Client::builder()
        .timeout(config.timeout)
        .user_agent(concat!("contentsync/", env!("CARGO_PKG_VERSION")));

    // Support proxy if configured (for Tor)
    if let Some(proxy_url) = &config.proxy_url {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    Ok(builder.build()?)
}

/// Fetches `url` with a size limit.
async fn fetch_bytes(client: &Client, url: &str, max_size: u64) -> Result<Vec<u8>, StoreError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(StoreError::HttpStatus(response.status().as_u16()));
    }

    // Check content length before downloading
    if let Some(len) = response.content_length() {
        if len > max_size {
            return Err(StoreError::TooLarge {
                size: len,
                max: max_size,
            });
        }
    }

    let data = response.bytes().await?.to_vec();

    // Verify size after download (in case content-length was missing)
    if data.len() as u64 > max_size {
        return Err(StoreError::TooLarge {
            size: data.len() as u64,
            max: max_size,
        });
    }

    Ok(data)
}

/// Catalog and content store backed by an HTTP server and a disk cache
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    manifest_url: String,
    max_content_size: u64,
    cache: Arc<DiskCache>,
    local: RwLock<CatalogManifest>,
    staged: RwLock<Option<CatalogManifest>>,
}

impl HttpRemoteStore {
    /// Creates a store from configuration.
    pub fn new(config: &SyncConfig) -> Result<Self, StoreError> {
        Self::with_client(config, build_client(config)?)
    }

    /// Creates a store that shares an existing client.
    pub fn with_client(config: &SyncConfig, client: Client) -> Result<Self, StoreError> {
        Ok(Self {
            client,
            base_url: config.remote_url.trim_end_matches('/').to_string(),
            manifest_url: config.manifest_url(),
            max_content_size: config.max_content_size,
            cache: Arc::new(DiskCache::new(&config.storage_path)?),
            local: RwLock::new(CatalogManifest::default()),
            staged: RwLock::new(None),
        })
    }

    /// The disk cache.
    pub fn cache(&self) -> &DiskCache {
        &self.cache
    }

    /// The installed manifest as currently held in memory.
    pub fn local_manifest(&self) -> CatalogManifest {
        read_lock(&self.local).clone()
    }

    fn install(&self, manifest: CatalogManifest) -> Result<ContentLocatorRegistry, StoreError> {
        self.cache.save_manifest(&manifest)?;
        let registry = manifest.to_registry();
        *write_lock(&self.local) = manifest;
        Ok(registry)
    }

    fn local_entry(&self, key: &ContentKey) -> Option<ContentEntry> {
        read_lock(&self.local).entry(key).cloned()
    }

    async fn fetch_manifest(&self, url: &str) -> Result<CatalogManifest, StoreError> {
        let data = fetch_bytes(&self.client, url, self.max_content_size).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl RemoteCatalogStore for HttpRemoteStore {
    async fn initialize(&self) -> Result<ContentLocatorRegistry, StoreError> {
        let manifest = self.cache.get_manifest()?.unwrap_or_default();
        debug!(
            catalogs = manifest.catalogs.len(),
            dir = %self.cache.dir().display(),
            "content cache opened"
        );
        let registry = manifest.to_registry();
        *write_lock(&self.local) = manifest;
        *write_lock(&self.staged) = None;
        Ok(registry)
    }

    fn clear_resource_locators(&self) -> Result<(), StoreError> {
        self.cache.clear_manifest()?;
        *write_lock(&self.local) = CatalogManifest::default();
        *write_lock(&self.staged) = None;
        Ok(())
    }

    async fn load_local_catalog(
        &self,
        location: &str,
    ) -> Result<ContentLocatorRegistry, StoreError> {
        let manifest = if location.starts_with("http://") || location.starts_with("https://") {
            self.fetch_manifest(location).await?
        } else {
            let data = tokio::fs::read_to_string(location).await?;
            serde_json::from_str(&data)?
        };
        info!(location, catalogs = manifest.catalogs.len(), "bundled catalog loaded");
        self.install(manifest)
    }

    async fn check_for_updates(&self) -> Result<BTreeSet<CatalogId>, StoreError> {
        let remote = self.fetch_manifest(&self.manifest_url).await?;

        let local = read_lock(&self.local);
        let updates = remote
            .catalogs
            .iter()
            .filter(|c| local.catalog(&c.id).map(|l| &l.hash) != Some(&c.hash))
            .map(|c| c.id.clone())
            .collect();
        Ok(updates)
    }

    async fn update_catalogs(
        &self,
        ids: &BTreeSet<CatalogId>,
    ) -> Result<Vec<LocatorMetadata>, StoreError> {
        let remote = self.fetch_manifest(&self.manifest_url).await?;

        let mut selected = Vec::with_capacity(ids.len());
        for id in ids {
            let catalog = remote
                .catalog(id)
                .ok_or_else(|| StoreError::NotFound(format!("catalog {id}")))?;
            selected.push(catalog.clone());
        }

        let locators: Vec<LocatorMetadata> = selected
            .iter()
            .flat_map(|c| c.locator_metadata())
            .collect();
        let next = read_lock(&self.local).with_catalogs(selected);
        *write_lock(&self.staged) = Some(next);
        debug!(catalogs = ids.len(), "catalog update staged");

        Ok(locators)
    }

    fn commit_catalogs(&self) -> Result<(), StoreError> {
        let staged = write_lock(&self.staged)
            .take()
            .ok_or_else(|| StoreError::NotFound("staged catalog update".to_string()))?;
        self.install(staged)?;
        info!("catalog update installed");
        Ok(())
    }
}

#[async_trait]
impl RemoteContentStore for HttpRemoteStore {
    async fn get_download_size(&self, key: &ContentKey) -> Result<Option<u64>, StoreError> {
        let entry = self
            .local_entry(key)
            .ok_or_else(|| StoreError::NotFound(format!("content key {key}")))?;

        if entry.path.is_none() {
            return Ok(None);
        }
        if self.cache.has_content(key, &entry.checksum) {
            return Ok(Some(0));
        }
        Ok(Some(entry.size_bytes))
    }

    fn download_dependencies(&self, key: &ContentKey) -> Box<dyn DownloadHandle> {
        let entry = self.local_entry(key);
        let key = key.clone();
        let client = self.client.clone();
        let cache = Arc::clone(&self.cache);
        let base_url = self.base_url.clone();
        let max_size = self.max_content_size;

        let task = tokio::spawn(async move {
            let entry = entry.ok_or_else(|| StoreError::NotFound(format!("content key {key}")))?;
            let Some(path) = entry.path.as_deref() else {
                return Ok(());
            };
            if cache.has_content(&key, &entry.checksum) {
                return Ok(());
            }

            let url = format!("{}/{}", base_url, path.trim_start_matches('/'));
            let data = fetch_bytes(&client, &url, max_size).await?;
            cache.save_content(&key, &data, &entry.checksum)?;
            debug!(%key, bytes = data.len(), "content cached");
            Ok(())
        });

        Box::new(HttpDownloadHandle { task: Some(task) })
    }
}

/// Download running on the tokio runtime.
pub struct HttpDownloadHandle {
    task: Option<JoinHandle<Result<(), StoreError>>>,
}

#[async_trait]
impl DownloadHandle for HttpDownloadHandle {
    async fn wait(&mut self) -> DownloadStatus {
        let Some(task) = self.task.take() else {
            return DownloadStatus::Failed("download already collected".to_string());
        };
        match task.await {
            Ok(Ok(())) => DownloadStatus::Succeeded,
            Ok(Err(e)) => DownloadStatus::Failed(e.to_string()),
            Err(e) => DownloadStatus::Failed(e.to_string()),
        }
    }

    fn release(self: Box<Self>) {
        if let Some(task) = self.task {
            task.abort();
        }
    }
}

/// HEAD-request probe transport.
#[derive(Clone)]
pub struct HttpProbeTransport {
    client: Client,
}

impl HttpProbeTransport {
    /// Creates a transport from configuration.
    pub fn new(config: &SyncConfig) -> Result<Self, StoreError> {
        Ok(Self::with_client(build_client(config)?))
    }

    /// Creates a transport that shares an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProbeTransport for HttpProbeTransport {
    async fn head(&self, endpoint: &str) -> Result<ProbeResponse, StoreError> {
        let response = self.client.head(endpoint).send().await?;
        Ok(ProbeResponse {
            status: response.status().as_u16(),
        })
    }
}
