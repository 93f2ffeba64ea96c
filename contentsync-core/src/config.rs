// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration for startup content synchronization

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use thiserror::Error;

use crate::flags::BOOTSTRAP_FLAG_KEY;

/// Configuration for the content sync pipeline and its reference stores
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Local storage path for the content cache and flag database
    pub storage_path: PathBuf,

    /// Remote content URL (e.g., "https://cdn.vauchi.app/content")
    pub remote_url: String,

    /// Endpoint probed for reachability before an incremental run
    pub probe_endpoint: String,

    /// Catalog bundled with the client, as a file path or http(s) URL
    pub local_catalog: String,

    /// Key of the persisted bootstrap flag
    pub flag_key: String,

    /// HTTP timeout for fetches
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,

    /// Maximum content file size (bytes)
    pub max_content_size: u64,

    /// Proxy URL
    pub proxy_url: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("."),
            remote_url: "https://cdn.vauchi.app/content".to_string(),
            probe_endpoint: "https://cdn.vauchi.app/".to_string(),
            local_catalog: "catalog.json".to_string(),
            flag_key: BOOTSTRAP_FLAG_KEY.to_string(),
            timeout: Duration::from_secs(30),
            max_content_size: 64 * 1024 * 1024, // 64 MB
            proxy_url: None,
        }
    }
}

impl SyncConfig {
    /// Loads a JSON configuration file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Configure with custom proxy
    pub fn with_proxy(mut self, proxy_url: String) -> Self {
        self.proxy_url = Some(proxy_url);
        self
    }

    /// Store cache and flags under `path`
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    /// URL of the remote catalog manifest
    pub fn manifest_url(&self) -> String {
        format!("{}/catalog.json", self.remote_url.trim_end_matches('/'))
    }

    /// Path of the SQLite flag database
    pub fn flag_db_path(&self) -> PathBuf {
        self.storage_path.join("flags.db")
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that was being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
