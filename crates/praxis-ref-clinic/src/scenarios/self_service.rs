//! Scenario 1: Physician Self-Service
//!
//! A staff physician opens the dashboard.  Their snapshot grants broad read
//! access but writes only on their own records, expressed as conditional
//! grants on `isSelf`.  The scenario walks the row-level cases:
//!
//! Sub-case A — editing their own profile        → allowed (isSelf = true)
//! Sub-case B — editing a colleague's profile    → denied  (isSelf = false)
//! Sub-case C — the permission admin screen      → denied  (explicit DENY)

use std::sync::Arc;

use praxis_contracts::{AccessContext, GateResult};
use praxis_store::{PermissionEvaluator, StaticSource};

use crate::fixtures::{physician_grants, physician_principal};

/// Build the physician's evaluator and load their snapshot.
async fn bootstrap() -> GateResult<PermissionEvaluator> {
    let source = StaticSource::from_grants(&physician_grants());
    let evaluator = PermissionEvaluator::new(Arc::new(source), physician_principal(), None);
    evaluator.refresh().await?;
    Ok(evaluator)
}

/// Run Scenario 1: Physician Self-Service.
pub async fn run_scenario() -> GateResult<()> {
    println!("=== Scenario 1: Physician Self-Service ===");
    println!();

    let evaluator = bootstrap().await?;

    // ── Sub-case A: own profile ───────────────────────────────────────────────

    let own_profile = AccessContext::new().with("isSelf", true);
    let decision = evaluator.explain_with_context("doctors", "update", &own_profile);
    println!("  Sub-case A: edit own profile");
    println!("  Context:    isSelf = true");
    println!("  Decision:   {}", decision);
    println!("  RESULT: {} (expected ALLOW)", verdict(decision.is_allowed()));
    println!();

    // ── Sub-case B: colleague's profile ───────────────────────────────────────

    let colleague = AccessContext::new().with("isSelf", false);
    let decision = evaluator.explain_with_context("doctors", "update", &colleague);
    println!("  Sub-case B: edit a colleague's profile");
    println!("  Context:    isSelf = false");
    println!("  Decision:   {}", decision);
    println!("  RESULT: {} (expected DENY)", verdict(decision.is_allowed()));
    println!();

    // ── Sub-case C: permission admin screen ───────────────────────────────────

    let decision = evaluator.explain("permissions", "read");
    println!("  Sub-case C: open the permission admin screen");
    println!("  Decision:   {}", decision);
    println!("  RESULT: {} (expected DENY)", verdict(decision.is_allowed()));
    println!();

    // The same gates, rendered declaratively: only the own-hours editor and
    // the read-only roster come back.
    let own_hours_editor = evaluator
        .gate("office-hours", "update")
        .with_context(AccessContext::new().with("isSelf", true))
        .show(|| "office-hours-editor");
    let roster = evaluator.gate("doctors", "read").show(|| "doctor-roster");
    let permission_admin = evaluator.gate("permissions", "read").show(|| "permission-admin");

    println!("  Rendered widgets:");
    for widget in [own_hours_editor, roster, permission_admin].into_iter().flatten() {
        println!("    - {widget}");
    }
    println!();

    Ok(())
}

fn verdict(allowed: bool) -> &'static str {
    if allowed {
        "ALLOW"
    } else {
        "DENY"
    }
}
