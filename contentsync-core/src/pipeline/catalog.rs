// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Catalog diff and apply.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::context::SyncContext;
use crate::error::{StoreError, SyncError, SyncResult};
use crate::events::SyncEvent;
use crate::registry::CatalogId;
use crate::store::RemoteCatalogStore;

fn apply_failure(updates: &CatalogUpdateSet, source: StoreError) -> SyncError {
    SyncError::CatalogApplyFailure {
        catalogs: updates.iter().cloned().collect(),
        source,
    }
}

/// Catalogs requiring an update in the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogUpdateSet(BTreeSet<CatalogId>);

impl CatalogUpdateSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no catalog needs an update.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of catalogs needing an update.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if `id` is in the set.
    pub fn contains(&self, id: &CatalogId) -> bool {
        self.0.contains(id)
    }

    /// Iterates over the catalog identifiers in order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogId> {
        self.0.iter()
    }

    /// The underlying set.
    pub fn as_set(&self) -> &BTreeSet<CatalogId> {
        &self.0
    }
}

impl<I: Into<CatalogId>> FromIterator<I> for CatalogUpdateSet {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        CatalogUpdateSet(iter.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeSet<CatalogId>> for CatalogUpdateSet {
    fn from(set: BTreeSet<CatalogId>) -> Self {
        CatalogUpdateSet(set)
    }
}

/// Computes and applies catalog metadata updates.
pub struct CatalogSynchronizer {
    store: Arc<dyn RemoteCatalogStore>,
}

impl CatalogSynchronizer {
    /// Creates a synchronizer over `store`.
    pub fn new(store: Arc<dyn RemoteCatalogStore>) -> Self {
        CatalogSynchronizer { store }
    }

    /// Asks the remote store which catalogs changed.
    ///
    /// Pure query: the registry is not touched.
    pub async fn diff(&self, ctx: &SyncContext) -> SyncResult<CatalogUpdateSet> {
        info!(run_id = %ctx.run_id(), "checking catalogs for updates");
        let ids = self
            .store
            .check_for_updates()
            .await
            .map_err(SyncError::CatalogDiffFailure)?;

        let updates = CatalogUpdateSet::from(ids);
        ctx.emit(SyncEvent::CatalogUpdatesFound {
            count: updates.len(),
        });
        Ok(updates)
    }

    /// Fetches new locator metadata for `updates`, commits it to the store
    /// and swaps the registry.
    ///
    /// All-or-nothing: any store failure leaves the registry as it was. An
    /// update that arrives after cancellation is never committed.
    pub async fn apply(&self, ctx: &SyncContext, updates: &CatalogUpdateSet) -> SyncResult<()> {
        if updates.is_empty() {
            debug!(run_id = %ctx.run_id(), "no new catalogs");
            return Ok(());
        }

        info!(run_id = %ctx.run_id(), count = updates.len(), "downloading updated catalogs");
        let locators = self
            .store
            .update_catalogs(updates.as_set())
            .await
            .map_err(|source| apply_failure(updates, source))?;

        if ctx.cancel().is_set() {
            warn!(run_id = %ctx.run_id(), "catalog update discarded after cancellation");
            return Err(SyncError::OperationCancelled);
        }
        self.store
            .commit_catalogs()
            .map_err(|source| apply_failure(updates, source))?;

        let next = ctx
            .registry()
            .snapshot()
            .with_catalog_updates(updates.as_set(), locators);
        debug!(
            run_id = %ctx.run_id(),
            locators = next.locator_count(),
            keys = next.key_count(),
            "registry replaced"
        );
        ctx.registry().replace(next);
        Ok(())
    }
}
