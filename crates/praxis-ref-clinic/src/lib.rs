//! # praxis-ref-clinic
//!
//! Clinic reference fixtures and scenarios for the Praxis permission gate.
//!
//! Demonstrates the gate over the admin dashboard's resource vocabulary in
//! three scenarios:
//!
//! 1. **Physician Self-Service** — row-level `isSelf` gating on profile and
//!    office-hours edits.
//! 2. **Front-Desk Booking** — the `manage` superset and the fail-closed
//!    default, with grants loaded from a TOML fixture file.
//! 3. **Admin Edits and Snapshot Lifecycle** — DENY-over-ALLOW, coalesced
//!    refresh, server-side invalidation, and logout.
//!
//! All data is hardcoded and fictional. No external calls are made.

pub mod fixtures;
pub mod scenarios;
