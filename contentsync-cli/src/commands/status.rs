// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Status Command
//!
//! Shows the bootstrap flag and the installed catalogs without changing
//! anything on disk.

use anyhow::{Context, Result};
use contentsync_core::content::DiskCache;
use contentsync_core::{BootstrapFlag, PersistentFlagStore, SqliteFlagStore, SyncConfig};

use crate::display;

/// Prints the local sync state.
pub fn run(config: &SyncConfig) -> Result<()> {
    let db_path = config.flag_db_path();
    let flag = if db_path.exists() {
        SqliteFlagStore::open(&db_path)
            .context("failed to open flag database")?
            .get(&config.flag_key)?
    } else {
        None
    };

    println!();
    display::field("Data dir", &config.storage_path.display().to_string());
    display::field("Remote", &config.remote_url);
    let state = match flag.map(BootstrapFlag::from_value) {
        Some(BootstrapFlag::Bootstrapped) => "bootstrapped",
        _ => "not bootstrapped",
    };
    display::field("Flag", state);

    let manifest = if config.storage_path.join("content").exists() {
        DiskCache::new(&config.storage_path)?.get_manifest()?
    } else {
        None
    };
    match manifest {
        Some(manifest) if !manifest.catalogs.is_empty() => {
            println!();
            for catalog in &manifest.catalogs {
                let keys: usize = catalog.locators.iter().map(|l| l.entries.len()).sum();
                display::field(catalog.id.as_str(), &format!("{} ({keys} keys)", catalog.hash));
            }
        }
        _ => {
            println!();
            display::info("No catalogs installed");
        }
    }
    println!();

    Ok(())
}
