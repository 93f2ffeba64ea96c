// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error Types
//!
//! `SyncError` is what the pipeline reports; `StoreError` is what the
//! external collaborators (catalog store, content store, flag store, probe
//! transport) report to it.

use thiserror::Error;

use crate::registry::{CatalogId, ContentKey};

/// Fatal conditions of a synchronization run.
///
/// Every variant is terminal for the run: the first one raised sets the
/// cancellation signal and the run ends in `Phase::Cancelled`.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The reachability probe did not get a successful response.
    #[error("connectivity failure: {0}")]
    ConnectivityFailure(String),

    /// Querying the remote store for catalog updates failed.
    #[error("catalog diff failure: {0}")]
    CatalogDiffFailure(#[source] StoreError),

    /// Fetching updated locator metadata failed.
    #[error("catalog apply failure for {catalogs:?}: {source}")]
    CatalogApplyFailure {
        /// Catalogs that were being updated.
        catalogs: Vec<CatalogId>,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// The download size of a key could not be determined.
    #[error("download size query failed for {key}: {source}")]
    DownloadSizeQueryFailure {
        /// Key being queried.
        key: ContentKey,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// At least one dependency download in a batch failed.
    #[error("download failed for {key} ({failed} of {issued} downloads failed)")]
    DownloadFailure {
        /// First key observed to fail.
        key: ContentKey,
        /// Number of failed downloads observed.
        failed: usize,
        /// Number of downloads issued by the batch.
        issued: usize,
    },

    /// The cancellation signal was observed before the operation finished.
    #[error("operation cancelled")]
    OperationCancelled,

    /// The persisted bootstrap flag could not be read or written.
    #[error("flag store failure: {0}")]
    FlagStoreFailure(#[source] StoreError),

    /// The catalog store failed to initialize.
    #[error("store initialization failure: {0}")]
    StoreInitFailure(#[source] StoreError),

    /// The bundled local catalog could not be loaded.
    #[error("local catalog failure: {0}")]
    LocalCatalogFailure(#[source] StoreError),
}

impl SyncError {
    /// Short kind name used in logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::ConnectivityFailure(_) => "connectivity",
            SyncError::CatalogDiffFailure(_) => "catalog_diff",
            SyncError::CatalogApplyFailure { .. } => "catalog_apply",
            SyncError::DownloadSizeQueryFailure { .. } => "download_size_query",
            SyncError::DownloadFailure { .. } => "download",
            SyncError::OperationCancelled => "cancelled",
            SyncError::FlagStoreFailure(_) => "flag_store",
            SyncError::StoreInitFailure(_) => "store_init",
            SyncError::LocalCatalogFailure(_) => "local_catalog",
        }
    }
}

/// Result type for pipeline operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors reported by the external collaborators.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Remote responded with a non-success HTTP status.
    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    /// Network/request error.
    #[cfg(feature = "http")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Requested catalog or key is not known to the store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Content too large.
    #[error("Content too large: {size} bytes (max {max})")]
    TooLarge {
        /// Actual size in bytes
        size: u64,
        /// Maximum allowed size in bytes
        max: u64,
    },

    /// Downloaded bytes did not match the advertised checksum.
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Expected checksum (hex string without prefix)
        expected: String,
        /// Actual computed checksum (hex string without prefix)
        actual: String,
    },

    /// Checksum format is invalid (missing "sha256:" prefix)
    #[error("Invalid checksum format, expected 'sha256:...'")]
    InvalidChecksum,

    /// Store used before `initialize()`.
    #[error("store not initialized")]
    NotInitialized,

    /// Free-form failure reported by a collaborator.
    #[error("{0}")]
    Other(String),
}
