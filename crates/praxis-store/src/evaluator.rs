//! The permission evaluator: cached snapshot, synchronous decisions,
//! coalesced refresh.
//!
//! One evaluator instance is created at login (dependency-injected, never a
//! module-level singleton) and torn down at logout via [`clear`].  The
//! decision surface (`can`, `can_with_context`, `explain*`) reads the
//! installed snapshot through an `RwLock` and never suspends, never errors,
//! and never performs I/O.  All network activity goes through [`refresh`],
//! which is single-flight: concurrent callers share one underlying fetch.
//!
//! [`clear`]: PermissionEvaluator::clear
//! [`refresh`]: PermissionEvaluator::refresh

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tracing::{debug, info, warn};

use praxis_contracts::{
    AccessContext, GateError, GateResult, GateState, PermissionSnapshot, PrincipalId, SnapshotId,
    TenantId,
};
use praxis_engine::{decide, decide_with_context, Decision};

use crate::decode::decode_grants;
use crate::gate::Gate;
use crate::source::PermissionSource;

// ── Internal state ────────────────────────────────────────────────────────────

/// Lifecycle phase of the snapshot slot, excluding `Loading` (which is
/// derived from the in-flight refresh, not stored — the slot can never be
/// observed half-way through a transition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotPhase {
    Uninitialized,
    Ready,
    Empty,
}

/// The snapshot slot.  Swapped atomically under a write lock; read on every
/// decision under a read lock.
struct Slot {
    snapshot: Option<Arc<PermissionSnapshot>>,
    phase: SlotPhase,
    /// Bumped by `clear()`.  A refresh that completes under an older
    /// generation is discarded instead of resurrecting grants after logout.
    generation: u64,
}

/// A refresh failure in a form the shared future can hand every waiter.
#[derive(Debug, Clone)]
struct RefreshFailure(String);

type SharedRefresh = Shared<BoxFuture<'static, Result<(), RefreshFailure>>>;

struct EvaluatorInner {
    source: Arc<dyn PermissionSource>,
    principal_id: PrincipalId,
    tenant_id: Option<TenantId>,
    slot: RwLock<Slot>,
    /// The single in-flight refresh, if any.  Guarded by a sync mutex; the
    /// guard is never held across an await.
    inflight: Mutex<Option<SharedRefresh>>,
    /// Source of monotonic snapshot versions, assigned in install order.
    versions: AtomicU64,
}

// ── Public evaluator ──────────────────────────────────────────────────────────

/// Answers authorization questions for one principal against a cached
/// permission snapshot.
///
/// ```rust,ignore
/// let evaluator = PermissionEvaluator::new(source, PrincipalId::new("dr-7"), None);
/// evaluator.refresh().await?;
///
/// if evaluator.can("doctors", "update") { /* render the edit button */ }
/// ```
///
/// Cloning is cheap and shares the same snapshot and in-flight state.
#[derive(Clone)]
pub struct PermissionEvaluator {
    inner: Arc<EvaluatorInner>,
}

impl PermissionEvaluator {
    /// Create an evaluator in the `Uninitialized` state.
    ///
    /// No fetch happens here; call [`refresh`](Self::refresh) (typically at
    /// login or app bootstrap) to load the first snapshot.
    pub fn new(
        source: Arc<dyn PermissionSource>,
        principal_id: PrincipalId,
        tenant_id: Option<TenantId>,
    ) -> Self {
        Self {
            inner: Arc::new(EvaluatorInner {
                source,
                principal_id,
                tenant_id,
                slot: RwLock::new(Slot {
                    snapshot: None,
                    phase: SlotPhase::Uninitialized,
                    generation: 0,
                }),
                inflight: Mutex::new(None),
                versions: AtomicU64::new(0),
            }),
        }
    }

    // ── Decision surface (sync, infallible) ──────────────────────────────────

    /// Answer a context-free authorization question.
    ///
    /// Always returns a boolean: unknown vocabulary, a missing snapshot, and
    /// even a poisoned lock all come back `false`.
    pub fn can(&self, resource: &str, action: &str) -> bool {
        self.explain(resource, action).is_allowed()
    }

    /// Answer an authorization question with row-level context
    /// (e.g. `isSelf` for "may this doctor edit their own profile").
    pub fn can_with_context(&self, resource: &str, action: &str, ctx: &AccessContext) -> bool {
        self.explain_with_context(resource, action, ctx).is_allowed()
    }

    /// Like [`can`](Self::can), but returns the full [`Decision`] for logs
    /// and debug panels.
    pub fn explain(&self, resource: &str, action: &str) -> Decision {
        self.with_grants(resource, action, |grants| decide(grants, resource, action))
    }

    /// Like [`can_with_context`](Self::can_with_context), with the full
    /// [`Decision`].
    pub fn explain_with_context(
        &self,
        resource: &str,
        action: &str,
        ctx: &AccessContext,
    ) -> Decision {
        self.with_grants(resource, action, |grants| {
            decide_with_context(grants, resource, action, ctx)
        })
    }

    fn with_grants(
        &self,
        resource: &str,
        action: &str,
        run: impl FnOnce(&[praxis_contracts::PermissionGrant]) -> Decision,
    ) -> Decision {
        let slot = match self.inner.slot.read() {
            Ok(slot) => slot,
            Err(e) => {
                // The decision surface must never panic or error; a poisoned
                // slot answers as if no snapshot were loaded.
                warn!(resource, action, error = %e, "snapshot slot poisoned; failing closed");
                return Decision::not_ready();
            }
        };

        match &slot.snapshot {
            Some(snapshot) => run(&snapshot.grants),
            None => {
                debug!(resource, action, phase = ?slot.phase, "no snapshot loaded; failing closed");
                Decision::not_ready()
            }
        }
    }

    /// Bind a declarative [`Gate`] for a (resource, action) pair.
    pub fn gate<'a>(&'a self, resource: &'a str, action: &'a str) -> Gate<'a> {
        Gate::new(self, resource, action)
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Fetch a fresh snapshot and install it atomically.
    ///
    /// Single-flight: if a refresh is already in flight, this call awaits it
    /// instead of issuing a second fetch.  While the fetch runs, the decision
    /// surface keeps answering from the previous snapshot (stale but
    /// available).  On failure, the previous snapshot stays in place and the
    /// error — always surfaced as [`GateError::SnapshotFetch`] — goes to the
    /// caller for retry decisions.
    pub async fn refresh(&self) -> GateResult<()> {
        let shared = {
            let mut inflight =
                self.inner
                    .inflight
                    .lock()
                    .map_err(|e| GateError::LockPoisoned {
                        reason: format!("in-flight refresh lock poisoned: {}", e),
                    })?;

            // Coalesce only onto a future that has not completed yet.  A
            // completed future can still be parked here when the caller
            // that started it was cancelled before retiring it; riding it
            // would resolve without fetching.
            let reusable = inflight
                .as_ref()
                .filter(|shared| shared.peek().is_none())
                .cloned();
            match reusable {
                Some(shared) => {
                    debug!("refresh already in flight; coalescing");
                    shared
                }
                None => {
                    let shared = Self::run_refresh(Arc::clone(&self.inner)).boxed().shared();
                    *inflight = Some(shared.clone());
                    shared
                }
            }
        };

        let result = shared.clone().await;

        // Retire the in-flight slot, but only if it still holds this very
        // future — a later refresh may already have replaced it.
        if let Ok(mut inflight) = self.inner.inflight.lock() {
            if inflight.as_ref().is_some_and(|cur| cur.ptr_eq(&shared)) {
                *inflight = None;
            }
        }

        result.map_err(|RefreshFailure(reason)| GateError::SnapshotFetch { reason })
    }

    async fn run_refresh(inner: Arc<EvaluatorInner>) -> Result<(), RefreshFailure> {
        let start_generation = inner
            .slot
            .read()
            .map_err(|e| RefreshFailure(format!("snapshot slot poisoned: {}", e)))?
            .generation;

        let payload = inner
            .source
            .fetch_snapshot(&inner.principal_id, inner.tenant_id.as_ref())
            .await
            .map_err(|e| RefreshFailure(e.to_string()))?;

        let (grants, skipped) = decode_grants(&payload.grants);
        if skipped > 0 {
            warn!(
                skipped,
                kept = grants.len(),
                "snapshot payload contained malformed grant entries"
            );
        }

        let snapshot = PermissionSnapshot {
            snapshot_id: SnapshotId::new(),
            principal_id: inner.principal_id.clone(),
            tenant_id: payload
                .tenant_id
                .map(TenantId::new)
                .or_else(|| inner.tenant_id.clone()),
            // Versions are assigned at install time, so completion order and
            // version order always agree (last writer wins).
            version: inner.versions.fetch_add(1, Ordering::SeqCst) + 1,
            fetched_at: Utc::now(),
            grants,
        };

        let mut slot = inner
            .slot
            .write()
            .map_err(|e| RefreshFailure(format!("snapshot slot poisoned: {}", e)))?;

        if slot.generation != start_generation {
            // clear() ran while the fetch was in flight; installing now
            // would resurrect grants after logout.
            info!(
                snapshot_id = %snapshot.snapshot_id.0,
                "discarding snapshot fetched before the slot was cleared"
            );
            return Ok(());
        }

        info!(
            snapshot_id = %snapshot.snapshot_id.0,
            version = snapshot.version,
            grant_count = snapshot.grants.len(),
            "permission snapshot installed"
        );
        slot.snapshot = Some(Arc::new(snapshot));
        slot.phase = SlotPhase::Ready;
        Ok(())
    }

    /// Bust the server-side permission cache for this principal.
    ///
    /// Does not touch the local snapshot; call
    /// [`refresh`](Self::refresh) afterwards to see the effects.
    pub async fn invalidate(&self) -> GateResult<()> {
        self.inner.source.invalidate(&self.inner.principal_id).await
    }

    /// Drop the snapshot at logout.  The gate enters `Empty` and every
    /// decision answers `false` until the next successful refresh.
    pub fn clear(&self) {
        // Drop the in-flight refresh handle first: a refresh issued after
        // logout must start a fresh fetch, not coalesce onto a fetch from
        // the session being torn down.  Callers already awaiting the old
        // future still resolve; the generation check below discards its
        // snapshot.
        {
            let mut inflight = match self.inner.inflight.lock() {
                Ok(inflight) => inflight,
                Err(poisoned) => poisoned.into_inner(),
            };
            *inflight = None;
        }

        // Clearing must succeed even if a panicking reader poisoned the
        // lock; the slot data itself is just an Option swap.
        let mut slot = match self.inner.slot.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.snapshot = None;
        slot.phase = SlotPhase::Empty;
        slot.generation += 1;
        info!(principal_id = %self.inner.principal_id.0, "permission snapshot cleared");
    }

    // ── Introspection ────────────────────────────────────────────────────────

    /// Current lifecycle state.  `Loading` whenever a refresh is in flight,
    /// regardless of whether an older snapshot is still serving queries.
    pub fn state(&self) -> GateState {
        let loading = self
            .inner
            .inflight
            .lock()
            .map(|g| g.is_some())
            .unwrap_or(false);
        if loading {
            return GateState::Loading;
        }

        match self.inner.slot.read() {
            Ok(slot) => match slot.phase {
                SlotPhase::Uninitialized => GateState::Uninitialized,
                SlotPhase::Ready => GateState::Ready,
                SlotPhase::Empty => GateState::Empty,
            },
            Err(_) => GateState::Empty,
        }
    }

    /// The currently installed snapshot, if any.  UI layers use this to gate
    /// on readiness separately from individual decisions.
    pub fn current_snapshot(&self) -> Option<Arc<PermissionSnapshot>> {
        self.inner
            .slot
            .read()
            .ok()
            .and_then(|slot| slot.snapshot.clone())
    }

    /// The principal this evaluator was built for.
    pub fn principal_id(&self) -> &PrincipalId {
        &self.inner.principal_id
    }
}
