// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory flag store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::PersistentFlagStore;
use crate::error::StoreError;

/// Flag store that lives only as long as the process.
///
/// Counts writes so tests can assert how often the flag was touched.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    values: Mutex<HashMap<String, i64>>,
    writes: AtomicUsize,
}

impl MemoryFlagStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with one flag already set.
    pub fn with_value(key: &str, value: i64) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_string(), value);
        }
        store
    }

    /// Number of `set` calls made so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl PersistentFlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StoreError::Other("flag store lock poisoned".into()))?;
        Ok(values.get(key).copied())
    }

    fn set(&self, key: &str, value: i64) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StoreError::Other("flag store lock poisoned".into()))?;
        values.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
