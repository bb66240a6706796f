//! Error types for the Praxis permission gate.
//!
//! All fallible operations in the gate return `GateResult<T>`.  Note that the
//! decision surface (`can` / `can_with_context`) is deliberately infallible —
//! it answers `false` instead of erroring.  Only snapshot lifecycle
//! operations (fetch, decode, refresh) produce these errors.

use thiserror::Error;

/// The unified error type for the Praxis permission gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// The permission source could not deliver a snapshot (network, auth,
    /// or server failure).  The previous snapshot, if any, stays in place.
    #[error("snapshot fetch failed: {reason}")]
    SnapshotFetch { reason: String },

    /// A grant entry in the snapshot payload was structurally invalid
    /// (missing field, wrong shape).  Malformed entries are skipped during
    /// decode; this variant surfaces only when a caller asks for strict
    /// decoding of a single entry.
    #[error("malformed grant entry: {reason}")]
    MalformedGrant { reason: String },

    /// A grants file or other configuration input could not be read or
    /// parsed.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// An internal lock was poisoned by a panicking thread.  Cannot happen
    /// under normal operation.
    #[error("internal lock poisoned: {reason}")]
    LockPoisoned { reason: String },
}

/// Convenience alias used throughout the Praxis crates.
pub type GateResult<T> = Result<T, GateError>;
