// SPDX-FileCopyrightText: 2026 Fortivault
// SPDX-License-Identifier: Apache-2.0

//! Case identifier generation.
//!
//! Format: `CSRU-<millis hex>-<random hex>`, e.g.
//! `CSRU-18C2F4A1B30-F5E6D7C8B9A0F1E2`. The timestamp gives rough temporal
//! ordering; eight random bytes keep concurrent submissions from colliding.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;

/// Prefix used for fraud-report cases.
pub const CASE_ID_PREFIX: &str = "CSRU";

pub fn generate_case_id(prefix: &str) -> String {
    let mut random = [0u8; 8];
    OsRng.fill_bytes(&mut random);
    format!(
        "{prefix}-{:X}-{}",
        Utc::now().timestamp_millis(),
        hex::encode_upper(random)
    )
}
