// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the persisted bootstrap flag

use tempfile::TempDir;

use contentsync_core::{
    BootstrapFlag, MemoryFlagStore, PersistentFlagStore, SqliteFlagStore, BOOTSTRAP_FLAG_KEY,
};

#[test]
fn test_absent_flag_defaults_to_zero_and_persists() {
    let store = MemoryFlagStore::new();

    let flag = BootstrapFlag::read(&store, BOOTSTRAP_FLAG_KEY).unwrap();

    assert_eq!(flag, BootstrapFlag::NotBootstrapped);
    assert_eq!(store.get(BOOTSTRAP_FLAG_KEY).unwrap(), Some(0));
    assert_eq!(store.write_count(), 1);
}

#[test]
fn test_present_flag_is_not_rewritten() {
    let store = MemoryFlagStore::with_value(BOOTSTRAP_FLAG_KEY, 1);

    let flag = BootstrapFlag::read(&store, BOOTSTRAP_FLAG_KEY).unwrap();

    assert!(flag.is_bootstrapped());
    assert_eq!(store.write_count(), 0);
}

#[test]
fn test_sqlite_flag_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("flags.db");

    {
        let store = SqliteFlagStore::open(&path).unwrap();
        assert_eq!(
            BootstrapFlag::read(&store, BOOTSTRAP_FLAG_KEY).unwrap(),
            BootstrapFlag::NotBootstrapped
        );
        BootstrapFlag::mark_bootstrapped(&store, BOOTSTRAP_FLAG_KEY).unwrap();
    }

    let store = SqliteFlagStore::open(&path).unwrap();
    assert_eq!(store.get(BOOTSTRAP_FLAG_KEY).unwrap(), Some(1));
    assert!(BootstrapFlag::read(&store, BOOTSTRAP_FLAG_KEY)
        .unwrap()
        .is_bootstrapped());
}

#[test]
fn test_sqlite_set_overwrites() {
    let store = SqliteFlagStore::in_memory().unwrap();

    store.set("k", 0).unwrap();
    store.set("k", 1).unwrap();

    assert_eq!(store.get("k").unwrap(), Some(1));
    assert_eq!(store.get("other").unwrap(), None);
}

#[test]
fn test_custom_flag_key_is_independent() {
    let store = MemoryFlagStore::with_value(BOOTSTRAP_FLAG_KEY, 1);

    let flag = BootstrapFlag::read(&store, "otherKey").unwrap();

    assert_eq!(flag, BootstrapFlag::NotBootstrapped);
}
