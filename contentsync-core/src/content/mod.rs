// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reference content store
//!
//! Catalogs are described by a JSON [`CatalogManifest`]. Each catalog
//! carries a hash; a hash that differs from the installed one marks the
//! catalog for update. Content bytes are verified using SHA-256 checksums
//! and cached locally in a [`DiskCache`].
//!
//! The HTTP transport lives behind the `http` feature.

mod cache;
#[cfg(feature = "http")]
mod http;
mod integrity;
mod manifest;

pub use cache::DiskCache;
#[cfg(feature = "http")]
pub use http::{build_client, HttpDownloadHandle, HttpProbeTransport, HttpRemoteStore};
pub use integrity::{compute_checksum, verify_checksum};
pub use manifest::{CatalogEntry, CatalogManifest, ContentEntry, LocatorEntry, SCHEMA_VERSION};
