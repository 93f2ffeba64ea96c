// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Configuration
//!
//! Resolves a [`SyncConfig`] from an optional JSON file, then applies
//! command-line and environment overrides on top.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use contentsync_core::SyncConfig;

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Data directory (cache and flag database).
    pub data_dir: Option<PathBuf>,
    /// Remote content URL.
    pub remote_url: Option<String>,
    /// Probe endpoint.
    pub probe_endpoint: Option<String>,
    /// Bundled catalog location.
    pub local_catalog: Option<String>,
    /// Proxy URL.
    pub proxy: Option<String>,
}

/// Default data directory: `<platform data dir>/contentsync`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("contentsync")
}

/// Builds the effective configuration.
pub fn resolve(file: Option<&Path>, overrides: Overrides) -> Result<SyncConfig> {
    let mut config = match file {
        Some(path) => SyncConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => SyncConfig::default().with_storage_path(default_data_dir()),
    };

    if let Some(dir) = overrides.data_dir {
        config = config.with_storage_path(dir);
    }
    if let Some(url) = overrides.remote_url {
        config.remote_url = url;
    }
    if let Some(endpoint) = overrides.probe_endpoint {
        config.probe_endpoint = endpoint;
    }
    if let Some(location) = overrides.local_catalog {
        config.local_catalog = location;
    }
    if let Some(proxy) = overrides.proxy {
        config = config.with_proxy(proxy);
    }

    Ok(config)
}
