//! # praxis-store
//!
//! Snapshot lifecycle for the Praxis permission gate.
//!
//! ## Overview
//!
//! This crate owns everything stateful around permission evaluation:
//!
//! - [`PermissionSource`] — the boundary to the remote permission service,
//!   with [`StaticSource`] as the in-memory reference implementation.
//! - [`decode`] — lenient payload decoding that skips malformed grant
//!   entries instead of failing the whole snapshot.
//! - [`PermissionEvaluator`] — the injected handle UI code talks to:
//!   synchronous `can`/`can_with_context` over the installed snapshot,
//!   coalesced async `refresh`, `clear` at logout.
//! - [`Gate`] — the render-or-nothing declarative primitive.
//!
//! The evaluation *algorithm* lives in `praxis-engine`; this crate only
//! decides which grants it runs against.

pub mod decode;
pub mod evaluator;
pub mod gate;
pub mod source;

pub use decode::{decode_grant, decode_grants};
pub use evaluator::PermissionEvaluator;
pub use gate::Gate;
pub use source::{PermissionSource, SnapshotPayload, StaticSource};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use praxis_contracts::{
        AccessContext, Effect, GateError, GateState, Operator, PermissionGrant, PrincipalId,
    };

    use crate::{PermissionEvaluator, SnapshotPayload, StaticSource};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn allow(resource: &str, action: &str) -> PermissionGrant {
        PermissionGrant::new(resource, action, Effect::Allow)
    }

    /// Build an evaluator over a `StaticSource`, returning both halves.
    fn gate_over(grants: &[PermissionGrant]) -> (PermissionEvaluator, StaticSource) {
        let source = StaticSource::from_grants(grants);
        let evaluator = PermissionEvaluator::new(
            Arc::new(source.clone()),
            PrincipalId::new("dr-7"),
            None,
        );
        (evaluator, source)
    }

    // ── 1. bootstrap ──────────────────────────────────────────────────────────

    /// Before any refresh the gate is `Uninitialized` and answers false for
    /// everything; the first refresh makes it `Ready`.
    #[tokio::test]
    async fn test_first_refresh_initializes_gate() {
        let (evaluator, source) = gate_over(&[allow("office-hours", "delete")]);

        assert_eq!(evaluator.state(), GateState::Uninitialized);
        assert!(!evaluator.can("office-hours", "delete"));

        evaluator.refresh().await.unwrap();

        assert_eq!(evaluator.state(), GateState::Ready);
        assert!(evaluator.can("office-hours", "delete"));
        assert!(!evaluator.can("office-hours", "create"));
        assert_eq!(source.fetch_count(), 1);

        let snapshot = evaluator.current_snapshot().unwrap();
        assert_eq!(snapshot.version, 1);
    }

    // ── 2. loading state ──────────────────────────────────────────────────────

    /// While a refresh is in flight the state reads `Loading`, and decisions
    /// keep answering from the previous snapshot (stale but available).
    #[tokio::test]
    async fn test_stale_snapshot_serves_during_refresh() {
        let (evaluator, source) = gate_over(&[allow("patients", "read")]);
        evaluator.refresh().await.unwrap();

        let slow = source.with_delay(Duration::from_millis(50));
        slow.set_grants(&[allow("patients", "read"), allow("blogs", "create")]);

        let background = {
            let evaluator = evaluator.clone();
            tokio::spawn(async move { evaluator.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Mid-flight: loading, and still answering from the old snapshot.
        assert_eq!(evaluator.state(), GateState::Loading);
        assert!(evaluator.can("patients", "read"));
        assert!(!evaluator.can("blogs", "create"));

        background.await.unwrap().unwrap();

        assert_eq!(evaluator.state(), GateState::Ready);
        assert!(evaluator.can("blogs", "create"));
        assert_eq!(evaluator.current_snapshot().unwrap().version, 2);
    }

    // ── 3. refresh coalescing ─────────────────────────────────────────────────

    /// Two concurrent `refresh()` calls share one underlying fetch.
    #[tokio::test]
    async fn test_concurrent_refreshes_coalesce() {
        let (evaluator, source) = gate_over(&[allow("doctors", "read")]);
        let source = source.with_delay(Duration::from_millis(30));

        let (a, b) = tokio::join!(evaluator.refresh(), evaluator.refresh());
        a.unwrap();
        b.unwrap();

        assert_eq!(source.fetch_count(), 1);
        assert!(evaluator.can("doctors", "read"));

        // A refresh issued after the first completed is a new fetch.
        evaluator.refresh().await.unwrap();
        assert_eq!(source.fetch_count(), 2);
    }

    // ── 4. failure keeps last-known-good ──────────────────────────────────────

    /// A failed refresh surfaces the error but leaves the previous snapshot
    /// serving — no fail-open and no premature lockout.
    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let (evaluator, source) = gate_over(&[allow("appointments", "manage")]);
        evaluator.refresh().await.unwrap();

        source.fail_with("HTTP 503 from permission service");
        let err = evaluator.refresh().await.unwrap_err();
        match err {
            GateError::SnapshotFetch { reason } => assert!(reason.contains("503")),
            other => panic!("expected SnapshotFetch, got {other:?}"),
        }

        // Stale-but-available: the manage superset still answers.
        assert_eq!(evaluator.state(), GateState::Ready);
        assert!(evaluator.can("appointments", "delete"));

        // Recovery is just a successful refresh.
        source.succeed();
        evaluator.refresh().await.unwrap();
        assert!(evaluator.can("appointments", "delete"));
    }

    /// A failed *first* fetch leaves the gate uninitialized and fail-closed.
    #[tokio::test]
    async fn test_failed_bootstrap_stays_fail_closed() {
        let (evaluator, source) = gate_over(&[allow("doctors", "read")]);
        source.fail_with("login token expired");

        assert!(evaluator.refresh().await.is_err());
        assert_eq!(evaluator.state(), GateState::Uninitialized);
        assert!(!evaluator.can("doctors", "read"));
    }

    // ── 5. revocation by refresh ──────────────────────────────────────────────

    /// After a refresh resolves with an empty grant list, every previously
    /// true answer becomes false.
    #[tokio::test]
    async fn test_empty_refresh_revokes_everything() {
        let (evaluator, source) =
            gate_over(&[allow("doctors", "read"), allow("specialties", "manage")]);
        evaluator.refresh().await.unwrap();
        assert!(evaluator.can("doctors", "read"));
        assert!(evaluator.can("specialties", "update"));

        source.set_grants(&[]);
        evaluator.refresh().await.unwrap();

        assert_eq!(evaluator.state(), GateState::Ready);
        assert!(!evaluator.can("doctors", "read"));
        assert!(!evaluator.can("specialties", "update"));
    }

    // ── 6. logout ─────────────────────────────────────────────────────────────

    /// `clear()` drops the snapshot: state `Empty`, every answer false.
    #[tokio::test]
    async fn test_clear_empties_the_gate() {
        let (evaluator, _source) = gate_over(&[allow("patients", "manage")]);
        evaluator.refresh().await.unwrap();
        assert!(evaluator.can("patients", "read"));

        evaluator.clear();

        assert_eq!(evaluator.state(), GateState::Empty);
        assert!(!evaluator.can("patients", "read"));
        assert!(evaluator.current_snapshot().is_none());
    }

    /// A refresh that completes after `clear()` must not resurrect grants.
    #[tokio::test]
    async fn test_refresh_completing_after_clear_is_discarded() {
        let (evaluator, source) = gate_over(&[allow("patients", "read")]);
        let _slow = source.with_delay(Duration::from_millis(50));

        let background = {
            let evaluator = evaluator.clone();
            tokio::spawn(async move { evaluator.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Logout while the fetch is still in flight.
        evaluator.clear();

        // The fetch itself succeeds, but its snapshot is discarded.
        background.await.unwrap().unwrap();
        assert_eq!(evaluator.state(), GateState::Empty);
        assert!(!evaluator.can("patients", "read"));
        assert!(evaluator.current_snapshot().is_none());
    }

    /// A refresh issued *after* `clear()` must start its own fetch — it may
    /// not ride the pre-logout fetch still in flight, whose snapshot is
    /// doomed to be discarded.
    #[tokio::test]
    async fn test_refresh_after_clear_starts_a_new_fetch() {
        let (evaluator, source) = gate_over(&[allow("patients", "read")]);
        let source = source.with_delay(Duration::from_millis(50));

        let background = {
            let evaluator = evaluator.clone();
            tokio::spawn(async move { evaluator.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Logout, then log back in on the same evaluator.
        evaluator.clear();
        evaluator.refresh().await.unwrap();

        // The post-logout refresh actually fetched and re-loaded the gate.
        assert_eq!(source.fetch_count(), 2);
        assert_eq!(evaluator.state(), GateState::Ready);
        assert!(evaluator.can("patients", "read"));

        // The pre-logout caller still resolves cleanly; its stale snapshot
        // did not clobber the newer one.
        background.await.unwrap().unwrap();
        assert!(evaluator.can("patients", "read"));
        assert_eq!(source.fetch_count(), 2);
    }

    /// Aborting the task that started a refresh must not wedge the gate:
    /// the next refresh drives the shared fetch to completion instead of
    /// resolving against a future nobody is polling.
    #[tokio::test]
    async fn test_refresh_survives_a_cancelled_caller() {
        let (evaluator, source) = gate_over(&[allow("doctors", "read")]);
        let source = source.with_delay(Duration::from_millis(40));

        let background = {
            let evaluator = evaluator.clone();
            tokio::spawn(async move { evaluator.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        background.abort();
        assert!(background.await.is_err());

        evaluator.refresh().await.unwrap();
        assert_eq!(evaluator.state(), GateState::Ready);
        assert!(evaluator.can("doctors", "read"));
        // The aborted caller's fetch was reused, not duplicated.
        assert_eq!(source.fetch_count(), 1);
    }

    // ── 7. malformed payload entries ──────────────────────────────────────────

    /// Malformed entries are skipped; the rest of the snapshot serves.
    #[tokio::test]
    async fn test_malformed_entries_do_not_poison_snapshot() {
        let source = StaticSource::new(SnapshotPayload {
            tenant_id: None,
            grants: vec![
                json!({ "resource": "doctors", "action": "read", "effect": "ALLOW" }),
                json!({ "resource": "patients", "effect": "ALLOW" }),
                json!(42),
            ],
        });
        let evaluator = PermissionEvaluator::new(
            Arc::new(source),
            PrincipalId::new("dr-7"),
            None,
        );

        evaluator.refresh().await.unwrap();

        assert!(evaluator.can("doctors", "read"));
        assert!(!evaluator.can("patients", "read"));
        assert_eq!(evaluator.current_snapshot().unwrap().grants.len(), 1);
    }

    // ── 8. context through the evaluator ──────────────────────────────────────

    /// The isSelf self-service case flows end-to-end through the handle.
    #[tokio::test]
    async fn test_can_with_context_through_evaluator() {
        let (evaluator, _source) = gate_over(&[
            PermissionGrant::new("doctors", "update", Effect::Allow)
                .with_condition("isSelf", Operator::Eq, true),
        ]);
        evaluator.refresh().await.unwrap();

        let own = AccessContext::new().with("isSelf", true);
        let other = AccessContext::new().with("isSelf", false);

        assert!(evaluator.can_with_context("doctors", "update", &own));
        assert!(!evaluator.can_with_context("doctors", "update", &other));
        assert!(!evaluator.can("doctors", "update"));
    }

    // ── 9. declarative gate ───────────────────────────────────────────────────

    /// `Gate::show` builds the widget only when permitted, and never calls
    /// the render closure on a denial.
    #[tokio::test]
    async fn test_gate_renders_or_nothing() {
        let (evaluator, _source) = gate_over(&[
            allow("appointments", "create"),
            PermissionGrant::new("doctors", "update", Effect::Allow)
                .with_condition("isSelf", Operator::Eq, true),
        ]);
        evaluator.refresh().await.unwrap();

        let book_button = evaluator
            .gate("appointments", "create")
            .show(|| "book-appointment-button");
        assert_eq!(book_button, Some("book-appointment-button"));

        let delete_button = evaluator
            .gate("appointments", "delete")
            .show(|| panic!("render must not run when denied"));
        assert_eq!(delete_button, None::<&str>);

        let edit_own = evaluator
            .gate("doctors", "update")
            .with_context(AccessContext::new().with("isSelf", true))
            .show(|| "edit-profile-form");
        assert_eq!(edit_own, Some("edit-profile-form"));
    }

    // ── 10. sources ───────────────────────────────────────────────────────────

    /// The TOML grants-file form parses into the same grants as the wire
    /// JSON form.
    #[tokio::test]
    async fn test_static_source_from_toml() {
        let source = StaticSource::from_toml_str(
            r#"
            [[grants]]
            resource = "doctors"
            action = "read"
            effect = "ALLOW"

            [[grants]]
            resource = "doctors"
            action = "update"
            effect = "ALLOW"

            [[grants.conditions]]
            field = "isSelf"
            operator = "eq"
            value = true
            "#,
        )
        .unwrap();

        let evaluator = PermissionEvaluator::new(
            Arc::new(source),
            PrincipalId::new("dr-7"),
            None,
        );
        evaluator.refresh().await.unwrap();

        assert!(evaluator.can("doctors", "read"));
        let own = AccessContext::new().with("isSelf", true);
        assert!(evaluator.can_with_context("doctors", "update", &own));
        assert!(!evaluator.can("doctors", "update"));
    }

    /// The JSON form accepts both a bare grant array and the object shape
    /// with tenant scoping.
    #[tokio::test]
    async fn test_snapshot_payload_json_forms() {
        let bare = SnapshotPayload::from_json_str(
            r#"[{ "resource": "blogs", "action": "read", "effect": "ALLOW" }]"#,
        )
        .unwrap();
        assert_eq!(bare.grants.len(), 1);
        assert!(bare.tenant_id.is_none());

        let scoped = SnapshotPayload::from_json_str(
            r#"{ "tenantId": "clinic-main",
                 "grants": [{ "resource": "blogs", "action": "read", "effect": "ALLOW" }] }"#,
        )
        .unwrap();
        assert_eq!(scoped.tenant_id.as_deref(), Some("clinic-main"));

        let err = SnapshotPayload::from_json_str("\"not a snapshot\"").unwrap_err();
        assert!(err.to_string().contains("array or object"));
    }

    /// `invalidate()` reaches the source; the local snapshot is untouched
    /// until the follow-up refresh.
    #[tokio::test]
    async fn test_invalidate_is_server_side_only() {
        let (evaluator, source) = gate_over(&[allow("staff", "read")]);
        evaluator.refresh().await.unwrap();

        source.set_grants(&[]);
        evaluator.invalidate().await.unwrap();
        assert_eq!(source.invalidation_count(), 1);

        // Still the old snapshot until refresh.
        assert!(evaluator.can("staff", "read"));
        evaluator.refresh().await.unwrap();
        assert!(!evaluator.can("staff", "read"));
    }
}
