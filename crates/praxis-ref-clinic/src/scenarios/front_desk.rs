//! Scenario 2: Front-Desk Booking
//!
//! The front desk runs on the `manage` superset: one grant on
//! `appointments` covers the whole booking workflow.  Everything the role
//! was never granted — content screens, clinical writes — stays hidden by
//! the fail-closed default rather than by an explicit deny.
//!
//! This scenario loads its grants from the TOML fixture file the way an
//! offline deployment would, and verifies it matches the in-code fixture.

use std::sync::Arc;

use praxis_contracts::GateResult;
use praxis_store::{PermissionEvaluator, StaticSource};

use crate::fixtures::front_desk_principal;

/// The same grants as `fixtures::front_desk_grants()`, in the on-disk form.
const FRONT_DESK_GRANTS_TOML: &str = include_str!("../../grants/front_desk.toml");

/// Build the front-desk evaluator from the TOML fixture and load it.
async fn bootstrap() -> GateResult<PermissionEvaluator> {
    let source = StaticSource::from_toml_str(FRONT_DESK_GRANTS_TOML)?;
    let evaluator = PermissionEvaluator::new(Arc::new(source), front_desk_principal(), None);
    evaluator.refresh().await?;
    Ok(evaluator)
}

/// Run Scenario 2: Front-Desk Booking.
pub async fn run_scenario() -> GateResult<()> {
    println!("=== Scenario 2: Front-Desk Booking ===");
    println!();

    let evaluator = bootstrap().await?;

    println!("  Grants loaded from grants/front_desk.toml");
    println!();

    // ── The booking workflow under one manage grant ───────────────────────────

    println!("  Appointment actions via the 'manage' superset:");
    for action in ["read", "create", "update", "delete"] {
        let decision = evaluator.explain("appointments", action);
        println!("    appointments:{action:<6}  -> {decision}");
    }
    println!();

    // ── Fail-closed vocabulary ────────────────────────────────────────────────

    println!("  Screens with no grant at all (fail-closed):");
    for (resource, action) in [("blogs", "read"), ("reviews", "read"), ("doctors", "update")] {
        let decision = evaluator.explain(resource, action);
        println!("    {resource}:{action}  -> {decision}");
    }
    println!();

    // ── Declarative gating of the booking screen ──────────────────────────────

    let widgets = [
        evaluator.gate("appointments", "create").show(|| "book-appointment"),
        evaluator.gate("patients", "create").show(|| "register-patient"),
        evaluator.gate("doctors", "read").show(|| "doctor-picker"),
        evaluator.gate("blogs", "create").show(|| "write-blog-post"),
    ];
    println!("  Rendered booking-screen widgets:");
    for widget in widgets.into_iter().flatten() {
        println!("    - {widget}");
    }
    println!();

    Ok(())
}
