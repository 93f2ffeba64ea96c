// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content Sync Core Library
//!
//! Startup synchronization of locally cached content against a remote
//! content store. On first launch the bundled catalog is installed and all
//! of its content is fetched; on later launches only changed catalogs are
//! applied and only content that still needs bytes is downloaded.
//!
//! The pipeline talks to storage through the traits in [`store`]; the
//! [`content`] module provides an HTTP and disk-cache implementation of
//! them.

pub mod config;
pub mod content;
pub mod context;
pub mod error;
pub mod events;
pub mod flags;
pub mod mock;
pub mod pipeline;
pub mod registry;
pub mod state;
pub mod store;

pub use config::{ConfigError, SyncConfig};
#[cfg(feature = "http")]
pub use content::{HttpProbeTransport, HttpRemoteStore};
pub use context::{CancellationSignal, ProgressTracker, SyncContext};
pub use error::{StoreError, SyncError, SyncResult};
pub use events::{CallbackHandler, EventDispatcher, EventHandler, SyncEvent};
pub use flags::{
    BootstrapFlag, MemoryFlagStore, PersistentFlagStore, SqliteFlagStore, BOOTSTRAP_FLAG_KEY,
};
pub use pipeline::{
    BatchReport, BypassPipeline, CatalogSynchronizer, CatalogUpdateSet, ConnectivityProbe,
    ContentFetcher, Orchestrator, ProgressMonitor, SyncHandle, SyncPipeline,
};
pub use registry::{
    CatalogId, ContentKey, ContentLocatorRegistry, LocatorId, LocatorMetadata, RegistryHandle,
};
pub use state::{ConnectionStatus, Phase, ProgressState, RunBranch, RunOutcome, RunReport};
pub use store::{
    DownloadHandle, DownloadStatus, ProbeResponse, ProbeTransport, RemoteCatalogStore,
    RemoteContentStore,
};
