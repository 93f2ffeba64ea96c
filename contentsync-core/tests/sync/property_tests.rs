// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Property tests for the bootstrap branch

use std::collections::BTreeMap;

use contentsync_core::mock::{MockCatalogStore, MockContentStore};
use contentsync_core::{ContentKey, ContentLocatorRegistry, LocatorMetadata};
use proptest::prelude::*;

use super::support::Harness;

fn arb_registry() -> impl Strategy<Value = ContentLocatorRegistry> {
    prop::collection::btree_map(
        "[a-z]{1,4}",
        prop::collection::vec("[a-z0-9]{1,6}", 0..6),
        0..6,
    )
    .prop_map(|locators| {
        ContentLocatorRegistry::from_locators(
            locators
                .into_iter()
                .map(|(locator, keys)| LocatorMetadata::new(locator, "base", keys)),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_bootstrap_attempts_every_key_exactly_once(local in arb_registry()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let h = Harness::first_run(MockCatalogStore::new().with_local(local.clone()), MockContentStore::new());

        let report = runtime.block_on(h.orchestrator().run(&h.context())).unwrap();

        let mut expected: BTreeMap<ContentKey, usize> = BTreeMap::new();
        for key in local.keys() {
            *expected.entry(key.clone()).or_insert(0) += 1;
        }
        let mut attempted: BTreeMap<ContentKey, usize> = BTreeMap::new();
        for key in h.content.attempts() {
            *attempted.entry(key).or_insert(0) += 1;
        }

        prop_assert_eq!(attempted, expected);
        prop_assert_eq!(report.downloads_issued, local.key_count());
        prop_assert_eq!(h.content.release_count(), local.key_count());
        prop_assert_eq!(h.flag(), Some(1));
    }
}
