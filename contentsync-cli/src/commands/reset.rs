// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reset Command
//!
//! Clears the bootstrap flag so the next sync runs the first-run download.

use std::fs;

use anyhow::{Context, Result};
use contentsync_core::{PersistentFlagStore, SqliteFlagStore, SyncConfig};

use crate::display;

/// Resets the bootstrap flag to `0`.
pub fn run(config: &SyncConfig) -> Result<()> {
    fs::create_dir_all(&config.storage_path)?;
    let flags =
        SqliteFlagStore::open(config.flag_db_path()).context("failed to open flag database")?;
    flags.set(&config.flag_key, 0)?;

    display::success("Bootstrap flag cleared, next sync downloads all content");
    Ok(())
}
