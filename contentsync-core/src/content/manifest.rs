// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Catalog manifest format used by the HTTP content store
//!
//! The same document describes the remote state (`catalog.json` on the
//! server) and the local state (`manifest.json` in the cache).

use serde::{Deserialize, Serialize};

use crate::registry::{CatalogId, ContentKey, ContentLocatorRegistry, LocatorId, LocatorMetadata};

/// Current manifest schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Catalog manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogManifest {
    /// Schema version for manifest format compatibility
    pub schema_version: u32,
    /// ISO 8601 timestamp when manifest was generated
    #[serde(default)]
    pub generated_at: String,
    /// Versioned catalogs
    #[serde(default)]
    pub catalogs: Vec<CatalogEntry>,
}

impl Default for CatalogManifest {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: String::new(),
            catalogs: Vec::new(),
        }
    }
}

/// One versioned catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog identifier
    pub id: CatalogId,
    /// Content hash of the catalog; a change means "needs update"
    pub hash: String,
    /// Locators defined by this catalog
    #[serde(default)]
    pub locators: Vec<LocatorEntry>,
}

/// One locator within a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorEntry {
    /// Locator identifier
    pub id: LocatorId,
    /// Content served by this locator
    #[serde(default)]
    pub entries: Vec<ContentEntry>,
}

/// One downloadable content key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Content key
    pub key: ContentKey,
    /// Path relative to the remote URL; absent when the key has no bytes
    /// of its own to download
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// SHA-256 checksum in format "sha256:hexstring"
    pub checksum: String,
    /// File size in bytes
    pub size_bytes: u64,
}

impl CatalogEntry {
    /// Locators of this catalog as registry metadata
    pub fn locator_metadata(&self) -> impl Iterator<Item = LocatorMetadata> + '_ {
        self.locators.iter().map(move |locator| LocatorMetadata {
            locator: locator.id.clone(),
            catalog: self.id.clone(),
            keys: locator.entries.iter().map(|e| e.key.clone()).collect(),
        })
    }
}

impl CatalogManifest {
    /// Finds a catalog by id
    pub fn catalog(&self, id: &CatalogId) -> Option<&CatalogEntry> {
        self.catalogs.iter().find(|c| &c.id == id)
    }

    /// Finds the first entry for a key across all catalogs
    pub fn entry(&self, key: &ContentKey) -> Option<&ContentEntry> {
        self.catalogs
            .iter()
            .flat_map(|c| c.locators.iter())
            .flat_map(|l| l.entries.iter())
            .find(|e| &e.key == key)
    }

    /// Registry of every locator in the manifest
    pub fn to_registry(&self) -> ContentLocatorRegistry {
        ContentLocatorRegistry::from_locators(
            self.catalogs.iter().flat_map(CatalogEntry::locator_metadata),
        )
    }

    /// Returns a manifest where the given catalogs replace (or extend) the
    /// ones with the same id
    pub fn with_catalogs(&self, updated: Vec<CatalogEntry>) -> CatalogManifest {
        let mut next = self.clone();
        for entry in updated {
            match next.catalogs.iter_mut().find(|c| c.id == entry.id) {
                Some(existing) => *existing = entry,
                None => next.catalogs.push(entry),
            }
        }
        next
    }
}
