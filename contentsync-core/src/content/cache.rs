// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Disk cache for catalog manifests and downloaded content
//!
//! Layout under `{storage_path}/content/`:
//! - `manifest.json`: the locally installed catalogs
//! - `blobs/<hex(key)>`: content bytes, one file per key
//!
//! All writes are atomic (temp file, then rename) so a crash never leaves
//! a partial file behind. Every write gets its own temp file, so concurrent
//! writers of the same key never race on it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::integrity::verify_checksum;
use super::manifest::CatalogManifest;
use crate::error::StoreError;
use crate::registry::ContentKey;

const MANIFEST_FILE: &str = "manifest.json";
const BLOB_DIR: &str = "blobs";

/// Local cache for remote content
#[derive(Debug)]
pub struct DiskCache {
    cache_dir: PathBuf,
}

impl DiskCache {
    /// Create a new cache at the given storage path
    ///
    /// Creates the `content/` subdirectory if it doesn't exist.
    pub fn new(storage_path: &Path) -> Result<Self, StoreError> {
        let cache_dir = storage_path.join("content");
        fs::create_dir_all(cache_dir.join(BLOB_DIR))?;
        Ok(Self { cache_dir })
    }

    /// Root directory of the cache
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Installed manifest, if any
    ///
    /// A missing file is `Ok(None)`; an unreadable one is an error.
    pub fn get_manifest(&self) -> Result<Option<CatalogManifest>, StoreError> {
        let path = self.cache_dir.join(MANIFEST_FILE);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Save manifest to cache
    pub fn save_manifest(&self, manifest: &CatalogManifest) -> Result<(), StoreError> {
        let path = self.cache_dir.join(MANIFEST_FILE);
        let data = serde_json::to_string_pretty(manifest)?;
        atomic_write(&path, data.as_bytes())
    }

    /// Remove the installed manifest. Blobs are kept and re-verified on use.
    pub fn clear_manifest(&self) -> Result<(), StoreError> {
        match fs::remove_file(self.cache_dir.join(MANIFEST_FILE)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Cached bytes for a key
    pub fn get_content(&self, key: &ContentKey) -> Option<Vec<u8>> {
        fs::read(self.blob_path(key)).ok()
    }

    /// Returns true if the cached bytes for `key` match `checksum`
    pub fn has_content(&self, key: &ContentKey, checksum: &str) -> bool {
        self.get_content(key)
            .is_some_and(|data| verify_checksum(&data, checksum).is_ok())
    }

    /// Save content to cache with checksum verification
    pub fn save_content(
        &self,
        key: &ContentKey,
        data: &[u8],
        checksum: &str,
    ) -> Result<(), StoreError> {
        verify_checksum(data, checksum)?;
        atomic_write(&self.blob_path(key), data)
    }

    fn blob_path(&self, key: &ContentKey) -> PathBuf {
        self.cache_dir
            .join(BLOB_DIR)
            .join(hex::encode(key.as_str().as_bytes()))
    }
}

/// Atomic file write (write to a unique temp file, then rename)
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    fs::write(&temp_path, data)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}
