//! The permission source boundary and its reference implementation.
//!
//! `PermissionSource` is the trust boundary between the gate and the remote
//! permission service.  The production implementation wraps the clinic
//! backend's REST endpoint; `StaticSource` is the in-memory reference
//! implementation used by tests, demos, and offline fixtures.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use praxis_contracts::{GateError, GateResult, PermissionGrant, PrincipalId, TenantId};

// ── Wire payload ──────────────────────────────────────────────────────────────

/// The raw snapshot shape a source delivers: grant entries as undecoded JSON
/// values plus optional tenant scoping.
///
/// Entries stay undecoded here so that one malformed entry cannot fail the
/// whole fetch — per-entry decoding (and skipping) happens in
/// [`decode_grants`](crate::decode::decode_grants).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPayload {
    /// Tenant the grants are scoped to, when the deployment is multi-clinic.
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Grant entries in server order, not yet decoded.
    #[serde(default)]
    pub grants: Vec<Value>,
}

impl SnapshotPayload {
    /// Wrap already-decoded grants into a payload (test/fixture helper).
    pub fn from_grants(grants: &[PermissionGrant]) -> Self {
        Self {
            tenant_id: None,
            grants: grants
                .iter()
                .map(|g| serde_json::to_value(g).expect("grant serialization cannot fail"))
                .collect(),
        }
    }

    /// Parse a JSON document into a payload.
    ///
    /// Accepts either the full object form
    /// `{"tenantId": ..., "grants": [...]}` or a bare grant array, which is
    /// what the permission endpoint returns for single-tenant deployments.
    pub fn from_json_str(s: &str) -> GateResult<Self> {
        let value: Value = serde_json::from_str(s).map_err(|e| GateError::Config {
            reason: format!("failed to parse snapshot JSON: {}", e),
        })?;

        match value {
            Value::Array(grants) => Ok(Self {
                tenant_id: None,
                grants,
            }),
            Value::Object(_) => serde_json::from_value(value).map_err(|e| GateError::Config {
                reason: format!("snapshot JSON does not match payload schema: {}", e),
            }),
            other => Err(GateError::Config {
                reason: format!(
                    "snapshot JSON must be an array or object, got {}",
                    kind_of(&other)
                ),
            }),
        }
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Source trait ──────────────────────────────────────────────────────────────

/// Where permission snapshots come from.
///
/// Implementations are expected to be shared behind an `Arc` and called from
/// the evaluator's refresh path only — the decision surface never touches
/// the source.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// Fetch the current grant payload for a principal.
    ///
    /// Errors surface as [`GateError::SnapshotFetch`]; the evaluator keeps
    /// its previous snapshot when this fails.
    async fn fetch_snapshot(
        &self,
        principal_id: &PrincipalId,
        tenant_id: Option<&TenantId>,
    ) -> GateResult<SnapshotPayload>;

    /// Bust any server-side cache for the principal.
    ///
    /// Called after administrative permission edits elsewhere in the system.
    /// The caller must still `refresh()` afterwards to see the effects.
    async fn invalidate(&self, principal_id: &PrincipalId) -> GateResult<()>;
}

// ── Static reference source ───────────────────────────────────────────────────

/// The mutable interior of a [`StaticSource`].
struct StaticState {
    payload: SnapshotPayload,
    fetches: u64,
    invalidations: u64,
    failure: Option<String>,
    delay: Option<Duration>,
}

/// An in-memory `PermissionSource` serving a fixed payload.
///
/// Used by tests, the demo scenarios, and offline fixtures.  The payload can
/// be swapped at runtime (simulating a server-side permission edit), fetches
/// can be made to fail (error-path tests), and an artificial delay keeps a
/// fetch in flight long enough to observe coalescing.
///
/// # Thread safety
///
/// All accessors acquire a `Mutex` internally; clones share the same state.
#[derive(Clone)]
pub struct StaticSource {
    state: Arc<Mutex<StaticState>>,
}

impl StaticSource {
    /// Build a source serving the given payload.
    pub fn new(payload: SnapshotPayload) -> Self {
        Self {
            state: Arc::new(Mutex::new(StaticState {
                payload,
                fetches: 0,
                invalidations: 0,
                failure: None,
                delay: None,
            })),
        }
    }

    /// Build a source from already-decoded grants.
    pub fn from_grants(grants: &[PermissionGrant]) -> Self {
        Self::new(SnapshotPayload::from_grants(grants))
    }

    /// Build a source from a JSON snapshot document (object or bare array).
    pub fn from_json_str(s: &str) -> GateResult<Self> {
        Ok(Self::new(SnapshotPayload::from_json_str(s)?))
    }

    /// Read the file at `path` and parse it as a TOML grants file.
    ///
    /// Expected shape:
    /// ```toml
    /// [[grants]]
    /// resource = "doctors"
    /// action = "read"
    /// effect = "ALLOW"
    ///
    /// [[grants.conditions]]
    /// field = "isSelf"
    /// operator = "eq"
    /// value = true
    /// ```
    pub fn from_file(path: &Path) -> GateResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GateError::Config {
            reason: format!("failed to read grants file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse `s` as a TOML grants file.
    pub fn from_toml_str(s: &str) -> GateResult<Self> {
        let file: GrantsFile = toml::from_str(s).map_err(|e| GateError::Config {
            reason: format!("failed to parse grants TOML: {}", e),
        })?;
        Ok(Self::from_grants(&file.grants))
    }

    /// Replace the served payload, as a permission edit on the server would.
    /// Takes effect on the next fetch.
    pub fn set_grants(&self, grants: &[PermissionGrant]) {
        let mut state = self.state.lock().expect("static source lock poisoned");
        state.payload = SnapshotPayload::from_grants(grants);
    }

    /// Replace the served payload with raw entries (malformed-entry tests).
    pub fn set_payload(&self, payload: SnapshotPayload) {
        let mut state = self.state.lock().expect("static source lock poisoned");
        state.payload = payload;
    }

    /// Make every subsequent fetch fail with the given reason.
    pub fn fail_with(&self, reason: impl Into<String>) {
        let mut state = self.state.lock().expect("static source lock poisoned");
        state.failure = Some(reason.into());
    }

    /// Clear a previously set failure; fetches succeed again.
    pub fn succeed(&self) {
        let mut state = self.state.lock().expect("static source lock poisoned");
        state.failure = None;
    }

    /// Delay every fetch by `delay`, keeping it observably in flight.
    pub fn with_delay(self, delay: Duration) -> Self {
        {
            let mut state = self.state.lock().expect("static source lock poisoned");
            state.delay = Some(delay);
        }
        self
    }

    /// How many fetches have been issued against this source.
    pub fn fetch_count(&self) -> u64 {
        self.state.lock().expect("static source lock poisoned").fetches
    }

    /// How many invalidations have been issued against this source.
    pub fn invalidation_count(&self) -> u64 {
        self.state
            .lock()
            .expect("static source lock poisoned")
            .invalidations
    }
}

#[async_trait]
impl PermissionSource for StaticSource {
    async fn fetch_snapshot(
        &self,
        principal_id: &PrincipalId,
        _tenant_id: Option<&TenantId>,
    ) -> GateResult<SnapshotPayload> {
        // Count and sample state up front; the lock must not be held across
        // the delay await.
        let (delay, outcome) = {
            let mut state = self.state.lock().map_err(|e| GateError::LockPoisoned {
                reason: format!("static source lock poisoned: {}", e),
            })?;
            state.fetches += 1;
            let outcome = match &state.failure {
                Some(reason) => Err(GateError::SnapshotFetch {
                    reason: reason.clone(),
                }),
                None => Ok(state.payload.clone()),
            };
            (state.delay, outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        debug!(principal_id = %principal_id.0, "static source served snapshot payload");
        outcome
    }

    async fn invalidate(&self, principal_id: &PrincipalId) -> GateResult<()> {
        let mut state = self.state.lock().map_err(|e| GateError::LockPoisoned {
            reason: format!("static source lock poisoned: {}", e),
        })?;
        state.invalidations += 1;
        debug!(principal_id = %principal_id.0, "static source invalidated");
        Ok(())
    }
}

/// The top-level structure deserialized from a TOML grants file.
#[derive(Debug, Deserialize)]
struct GrantsFile {
    /// Ordered grant list, same order the server would return.
    grants: Vec<PermissionGrant>,
}
