//! # praxis-contracts
//!
//! Shared types and contracts for the Praxis permission gate.
//!
//! All crates in the workspace import from here.  No business logic lives in
//! this crate — only data definitions and error types.  In particular, what
//! a grant *means* (the `manage` superset, deny precedence, condition
//! matching) is defined by `praxis-engine`, not by the types themselves.

pub mod context;
pub mod error;
pub mod grant;
pub mod snapshot;

pub use context::AccessContext;
pub use error::{GateError, GateResult};
pub use grant::{Condition, Effect, Operator, PermissionGrant};
pub use snapshot::{GateState, PermissionSnapshot, PrincipalId, SnapshotId, TenantId};
