// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content Locator Registry
//!
//! Maps locator identifiers to the ordered set of content keys they serve.
//! Readers work on an immutable `Arc` snapshot; catalog updates build a new
//! registry and swap it in as a whole.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                $name(id)
            }
        }
    };
}

string_id!(
    /// Key of a piece of content whose dependencies can be downloaded.
    ContentKey
);
string_id!(
    /// Identifier of a content locator.
    LocatorId
);
string_id!(
    /// Identifier of a versioned catalog.
    CatalogId
);

/// Locator metadata as delivered by a catalog store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorMetadata {
    /// Locator identifier.
    pub locator: LocatorId,
    /// Catalog this locator belongs to.
    pub catalog: CatalogId,
    /// Keys served by this locator, in catalog order.
    pub keys: Vec<ContentKey>,
}

impl LocatorMetadata {
    /// Creates locator metadata from string-like parts.
    pub fn new<K: Into<ContentKey>>(
        locator: impl Into<LocatorId>,
        catalog: impl Into<CatalogId>,
        keys: impl IntoIterator<Item = K>,
    ) -> Self {
        LocatorMetadata {
            locator: locator.into(),
            catalog: catalog.into(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LocatorEntry {
    catalog: CatalogId,
    keys: Vec<ContentKey>,
}

/// Locator identifier → ordered set of content keys.
///
/// Key order within a locator follows insertion order; duplicates are
/// dropped. Locators iterate in identifier order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentLocatorRegistry {
    locators: BTreeMap<LocatorId, LocatorEntry>,
}

impl ContentLocatorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from locator metadata. Later entries for the same
    /// locator replace earlier ones.
    pub fn from_locators(locators: impl IntoIterator<Item = LocatorMetadata>) -> Self {
        let mut registry = Self::new();
        for metadata in locators {
            registry.insert(metadata);
        }
        registry
    }

    /// Inserts or replaces a locator.
    pub fn insert(&mut self, metadata: LocatorMetadata) {
        let mut keys: Vec<ContentKey> = Vec::with_capacity(metadata.keys.len());
        for key in metadata.keys {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        self.locators.insert(
            metadata.locator,
            LocatorEntry {
                catalog: metadata.catalog,
                keys,
            },
        );
    }

    /// Returns a new registry where every locator of an updated catalog is
    /// dropped and the given locators are inserted in their place.
    pub fn with_catalog_updates(
        &self,
        updated: &BTreeSet<CatalogId>,
        locators: impl IntoIterator<Item = LocatorMetadata>,
    ) -> Self {
        let mut next = self.clone();
        next.locators
            .retain(|_, entry| !updated.contains(&entry.catalog));
        for metadata in locators {
            next.insert(metadata);
        }
        next
    }

    /// Keys served by a locator.
    pub fn keys_of(&self, locator: &LocatorId) -> Option<&[ContentKey]> {
        self.locators.get(locator).map(|e| e.keys.as_slice())
    }

    /// Catalog a locator belongs to.
    pub fn catalog_of(&self, locator: &LocatorId) -> Option<&CatalogId> {
        self.locators.get(locator).map(|e| &e.catalog)
    }

    /// Iterates over locator identifiers.
    pub fn locators(&self) -> impl Iterator<Item = &LocatorId> {
        self.locators.keys()
    }

    /// Iterates over every key of every locator, locator by locator.
    ///
    /// A key served by two locators is yielded twice.
    pub fn keys(&self) -> impl Iterator<Item = &ContentKey> {
        self.locators.values().flat_map(|e| e.keys.iter())
    }

    /// Number of locators.
    pub fn locator_count(&self) -> usize {
        self.locators.len()
    }

    /// Total number of keys across all locators.
    pub fn key_count(&self) -> usize {
        self.locators.values().map(|e| e.keys.len()).sum()
    }

    /// Returns true if the registry has no locators.
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}

/// Shared holder of the current registry snapshot.
///
/// The only writer is catalog apply, which replaces the snapshot between
/// phases.
#[derive(Debug, Clone, Default)]
pub struct RegistryHandle {
    current: Arc<RwLock<Arc<ContentLocatorRegistry>>>,
}

impl RegistryHandle {
    /// Creates a handle holding the given registry.
    pub fn new(registry: ContentLocatorRegistry) -> Self {
        RegistryHandle {
            current: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<ContentLocatorRegistry> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replaces the whole registry.
    pub fn replace(&self, registry: ContentLocatorRegistry) {
        let next = Arc::new(registry);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
