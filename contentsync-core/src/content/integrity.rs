// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! SHA-256 checksums in the `sha256:<hex>` form used by catalog manifests.

use ring::digest::{digest, SHA256};

use crate::error::StoreError;

const PREFIX: &str = "sha256:";

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(digest(&SHA256, data).as_ref())
}

/// Checksum of `data` in manifest form.
pub fn compute_checksum(data: &[u8]) -> String {
    format!("{PREFIX}{}", sha256_hex(data))
}

/// Checks `data` against a manifest checksum.
pub fn verify_checksum(data: &[u8], expected: &str) -> Result<(), StoreError> {
    let expected_hex = expected
        .strip_prefix(PREFIX)
        .ok_or(StoreError::InvalidChecksum)?;
    let actual = sha256_hex(data);

    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(StoreError::ChecksumMismatch {
            expected: expected_hex.to_string(),
            actual,
        })
    }
}
