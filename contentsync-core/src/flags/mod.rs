// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persisted Flags
//!
//! The only state this crate persists is the bootstrap flag: one integer
//! under a well-known key. The store backing it is a host concern; two
//! implementations are provided.

mod memory;
mod sqlite;

pub use memory::MemoryFlagStore;
pub use sqlite::SqliteFlagStore;

use tracing::debug;

use crate::error::StoreError;

/// Default key of the bootstrap flag.
pub const BOOTSTRAP_FLAG_KEY: &str = "dependenciesDownload";

/// Integer key/value store for persisted flags.
pub trait PersistentFlagStore: Send + Sync {
    /// Reads a flag. Returns `Ok(None)` if it was never written.
    fn get(&self, key: &str) -> Result<Option<i64>, StoreError>;

    /// Writes a flag.
    fn set(&self, key: &str, value: i64) -> Result<(), StoreError>;
}

/// Whether the full first-run download has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapFlag {
    /// Stored value `0`, or never stored.
    NotBootstrapped,
    /// Any non-zero stored value.
    Bootstrapped,
}

impl BootstrapFlag {
    /// Reads the flag, persisting the `0` default when absent.
    pub fn read(store: &dyn PersistentFlagStore, key: &str) -> Result<Self, StoreError> {
        let value = match store.get(key)? {
            Some(value) => value,
            None => {
                debug!(key, "bootstrap flag absent, persisting default");
                store.set(key, 0)?;
                0
            }
        };
        Ok(Self::from_value(value))
    }

    /// Marks bootstrap as done.
    pub fn mark_bootstrapped(store: &dyn PersistentFlagStore, key: &str) -> Result<(), StoreError> {
        store.set(key, 1)
    }

    /// Interprets a stored value.
    pub fn from_value(value: i64) -> Self {
        if value == 0 {
            BootstrapFlag::NotBootstrapped
        } else {
            BootstrapFlag::Bootstrapped
        }
    }

    /// Returns true if bootstrap has completed.
    pub fn is_bootstrapped(self) -> bool {
        self == BootstrapFlag::Bootstrapped
    }
}
