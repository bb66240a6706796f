//! Clinic reference scenarios.
//!
//! Each scenario is a self-contained module that wires real Praxis
//! components (static source, evaluator, gates) with fixture grant data and
//! demonstrates a distinct gating pattern.

pub mod admin_refresh;
pub mod front_desk;
pub mod self_service;
