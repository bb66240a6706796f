//! Praxis Clinic Permission Gate — Demo CLI
//!
//! Runs one or all of the three clinic demo scenarios.  Each scenario uses
//! real Praxis components (static permission source, evaluator, gates) wired
//! together with fixture grant data.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- self-service
//!   cargo run -p demo -- front-desk
//!   cargo run -p demo -- admin-refresh

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use praxis_contracts::GateResult;
use praxis_ref_clinic::scenarios::{admin_refresh, front_desk, self_service};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Praxis — fail-closed permission gating for the clinic dashboard.
///
/// Each subcommand runs one or all of the three clinic scenarios,
/// demonstrating row-level conditions, the manage superset, deny
/// precedence, and the snapshot refresh lifecycle.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Praxis clinic permission gate demo",
    long_about = "Runs Praxis clinic demo scenarios showing fail-closed gating,\n\
                  row-level conditional grants, DENY-over-ALLOW precedence,\n\
                  and coalesced snapshot refresh."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three clinic scenarios in sequence.
    RunAll,
    /// Scenario 1: Physician Self-Service (row-level isSelf conditions).
    SelfService,
    /// Scenario 2: Front-Desk Booking (manage superset, fail-closed default).
    FrontDesk,
    /// Scenario 3: Admin Edits and Snapshot Lifecycle (refresh, logout).
    AdminRefresh,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all().await,
        Command::SelfService => self_service::run_scenario().await,
        Command::FrontDesk => front_desk::run_scenario().await,
        Command::AdminRefresh => admin_refresh::run_scenario().await,
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

async fn run_all() -> GateResult<()> {
    self_service::run_scenario().await?;
    front_desk::run_scenario().await?;
    admin_refresh::run_scenario().await?;
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Praxis — Clinic Permission Gate");
    println!("Reference Demo");
    println!("===============================");
    println!();
    println!("Every gated question flows through one evaluation routine:");
    println!("  [1] Grants matching (resource, action) are found ('manage' implies CRUD)");
    println!("  [2] Conditional grants are checked against row-level context (fail-closed)");
    println!("  [3] Any applicable DENY beats any applicable ALLOW");
    println!("  [4] No applicable grant means DENY by default");
    println!();
}
