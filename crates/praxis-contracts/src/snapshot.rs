//! Snapshot and identity types.
//!
//! A snapshot is the full, immutable set of grants loaded for one principal.
//! A new fetch produces a whole new snapshot that atomically replaces the
//! old one — there are no partial updates.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grant::PermissionGrant;

/// The identity of the logged-in principal, as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    /// Construct a principal id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Optional tenant scoping for multi-clinic deployments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    /// Construct a tenant id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Locally-assigned identifier for one fetched snapshot.
///
/// Fresh per fetch; used in diagnostics to tell which snapshot a decision
/// was made against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub Uuid);

impl SnapshotId {
    /// Generate a new random snapshot id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

/// The ordered set of grants currently loaded for a principal.
///
/// Immutable once built.  `version` increases monotonically in install
/// order, so a consumer holding two snapshots can always tell which is
/// newer regardless of when their fetches started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionSnapshot {
    /// Local identifier for this snapshot instance.
    pub snapshot_id: SnapshotId,

    /// The principal these grants belong to.
    pub principal_id: PrincipalId,

    /// Tenant scoping, when the deployment is multi-clinic.
    pub tenant_id: Option<TenantId>,

    /// Monotonic install-order version.  Assigned by the evaluator when the
    /// snapshot is swapped in, not by the server.
    pub version: u64,

    /// When the snapshot was fetched.
    pub fetched_at: DateTime<Utc>,

    /// All grants, in the order the server returned them.
    pub grants: Vec<PermissionGrant>,
}

impl PermissionSnapshot {
    /// Return true if the snapshot holds no grants at all.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// The set of context field names the loaded grants actually reference.
    ///
    /// Lets call sites validate that the fields they pass in an
    /// `AccessContext` can ever matter under the current snapshot.
    pub fn referenced_context_fields(&self) -> BTreeSet<&str> {
        self.grants
            .iter()
            .flat_map(|g| g.conditions.iter())
            .map(|c| c.field.as_str())
            .collect()
    }
}

/// Lifecycle phase of the permission gate.
///
/// `Uninitialized -> Loading -> Ready` on first fetch,
/// `Ready -> Loading -> Ready` on refresh, `Ready -> Empty` on logout.
/// In `Uninitialized` and `Empty`, every `can` query answers false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateState {
    /// No snapshot has ever been loaded.
    Uninitialized,
    /// A fetch is in flight.  Queries keep answering from the previous
    /// snapshot if one exists, otherwise false.
    Loading,
    /// A snapshot is loaded and serving queries.
    Ready,
    /// Logged out.  The snapshot is gone and every query answers false.
    Empty,
}
