//! Scenario 3: Admin Edits and Snapshot Lifecycle
//!
//! A practice administrator's session, end to end:
//!
//! Sub-case A — DENY-over-ALLOW: `manage` on the audit log coexists with a
//!              standing DENY on deletion, and the deny wins.
//! Sub-case B — coalescing: two dashboard panels refresh at once; only one
//!              fetch reaches the permission service.
//! Sub-case C — a permission edit lands server-side; invalidate + refresh
//!              makes the revocation visible.
//! Sub-case D — logout clears the gate; everything answers false.

use std::sync::Arc;

use praxis_contracts::{GateResult, GateState, PermissionGrant};
use praxis_store::{PermissionEvaluator, StaticSource};

use crate::fixtures::{practice_admin_grants, practice_admin_principal};

/// Build the admin's evaluator over a source the scenario can edit.
fn bootstrap() -> (PermissionEvaluator, StaticSource) {
    let source = StaticSource::from_grants(&practice_admin_grants());
    let evaluator = PermissionEvaluator::new(
        Arc::new(source.clone()),
        practice_admin_principal(),
        None,
    );
    (evaluator, source)
}

/// Run Scenario 3: Admin Edits and Snapshot Lifecycle.
pub async fn run_scenario() -> GateResult<()> {
    println!("=== Scenario 3: Admin Edits and Snapshot Lifecycle ===");
    println!();

    let (evaluator, source) = bootstrap();
    evaluator.refresh().await?;

    // ── Sub-case A: deny beats allow ──────────────────────────────────────────

    println!("  Sub-case A: audit-log carve-out (DENY beats ALLOW)");
    println!("    audit-log:read    -> {}", evaluator.explain("audit-log", "read"));
    println!("    audit-log:delete  -> {}", evaluator.explain("audit-log", "delete"));
    println!();

    // ── Sub-case B: coalesced refresh ─────────────────────────────────────────

    let fetches_before = source.fetch_count();
    let (first, second) = tokio::join!(evaluator.refresh(), evaluator.refresh());
    first?;
    second?;
    let fetches = source.fetch_count() - fetches_before;
    println!("  Sub-case B: two concurrent refreshes");
    println!("    fetches issued to the permission service: {fetches} (expected 1)");
    println!();

    // ── Sub-case C: permission edit + invalidate + refresh ────────────────────

    // Another admin revokes this admin's blog access; the server-side cache
    // is busted and the dashboard refreshes.
    let trimmed: Vec<PermissionGrant> = practice_admin_grants()
        .into_iter()
        .filter(|g| g.resource != "blogs")
        .collect();
    source.set_grants(&trimmed);

    println!("  Sub-case C: blog access revoked server-side");
    println!("    before refresh: blogs:update -> {}", verdict(&evaluator, "blogs", "update"));
    evaluator.invalidate().await?;
    evaluator.refresh().await?;
    println!("    after refresh:  blogs:update -> {}", verdict(&evaluator, "blogs", "update"));
    println!();

    // ── Sub-case D: logout ────────────────────────────────────────────────────

    evaluator.clear();
    println!("  Sub-case D: logout");
    println!("    state             -> {:?}", evaluator.state());
    println!("    doctors:read      -> {}", verdict(&evaluator, "doctors", "read"));
    println!();

    debug_assert_eq!(evaluator.state(), GateState::Empty);
    Ok(())
}

fn verdict(evaluator: &PermissionEvaluator, resource: &str, action: &str) -> &'static str {
    if evaluator.can(resource, action) {
        "ALLOW"
    } else {
        "DENY"
    }
}
