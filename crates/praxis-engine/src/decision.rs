//! Decision types returned by the evaluation core.
//!
//! A `Decision` is a boolean verdict plus enough context to explain it in a
//! log line or a debug panel.  Decisions are cheap to build — they carry
//! grant indexes into the evaluated snapshot, not grant clones.

use std::fmt;

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// An ALLOW grant applied and no DENY grant did.  `grant_index` points
    /// into the grant slice the decision was made against.
    AllowedBy { grant_index: usize },

    /// A DENY grant applied.  DENY wins over any number of applicable
    /// ALLOW grants.
    DeniedBy { grant_index: usize },

    /// No grant applied to the (resource, action) pair — the implicit,
    /// fail-closed default.
    NoMatchingGrant,

    /// No snapshot is loaded (gate uninitialized or logged out).
    NotReady,
}

/// The outcome of one `can` / `can_with_context` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub reason: DecisionReason,
}

impl Decision {
    pub(crate) fn allowed_by(grant_index: usize) -> Self {
        Self {
            allowed: true,
            reason: DecisionReason::AllowedBy { grant_index },
        }
    }

    pub(crate) fn denied_by(grant_index: usize) -> Self {
        Self {
            allowed: false,
            reason: DecisionReason::DeniedBy { grant_index },
        }
    }

    pub(crate) fn no_matching_grant() -> Self {
        Self {
            allowed: false,
            reason: DecisionReason::NoMatchingGrant,
        }
    }

    /// The verdict used before any snapshot exists and after logout.
    pub fn not_ready() -> Self {
        Self {
            allowed: false,
            reason: DecisionReason::NotReady,
        }
    }

    /// Convenience accessor matching the UI-facing boolean contract.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            DecisionReason::AllowedBy { grant_index } => {
                write!(f, "allowed by grant #{grant_index}")
            }
            DecisionReason::DeniedBy { grant_index } => {
                write!(f, "denied by grant #{grant_index}")
            }
            DecisionReason::NoMatchingGrant => write!(f, "denied by default: no grant matched"),
            DecisionReason::NotReady => write!(f, "denied: no permission snapshot loaded"),
        }
    }
}
