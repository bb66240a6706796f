//! Lenient decoding of snapshot payloads.
//!
//! A permission edit gone wrong on the server must not lock every user out:
//! a structurally invalid grant entry is skipped with a diagnostic while the
//! rest of the snapshot still loads.  Skipping is strictly safer than
//! guessing — a grant we cannot read is a grant we do not honor.
//!
//! Unknown *operators* are not malformed: they decode into
//! `Operator::Other` and fail closed at evaluation time instead.

use serde_json::Value;
use tracing::warn;

use praxis_contracts::{GateError, GateResult, PermissionGrant};

/// Decode one payload entry strictly.
pub fn decode_grant(entry: &Value) -> GateResult<PermissionGrant> {
    serde_json::from_value(entry.clone()).map_err(|e| GateError::MalformedGrant {
        reason: e.to_string(),
    })
}

/// Decode all payload entries, skipping malformed ones.
///
/// Returns the decoded grants in payload order plus the number of entries
/// skipped.  Each skip emits a `warn!` diagnostic carrying the entry index
/// and the decode error, for operators chasing a bad permission edit.
pub fn decode_grants(entries: &[Value]) -> (Vec<PermissionGrant>, usize) {
    let mut grants = Vec::with_capacity(entries.len());
    let mut skipped = 0;

    for (index, entry) in entries.iter().enumerate() {
        match decode_grant(entry) {
            Ok(grant) => grants.push(grant),
            Err(e) => {
                warn!(
                    entry_index = index,
                    error = %e,
                    "skipping malformed grant entry in snapshot payload"
                );
                skipped += 1;
            }
        }
    }

    (grants, skipped)
}
