//! # praxis-engine
//!
//! The fail-closed evaluation core of the Praxis permission gate.
//!
//! ## Overview
//!
//! This crate answers authorization questions over a slice of
//! [`PermissionGrant`](praxis_contracts::PermissionGrant)s.  It owns no
//! state and performs no I/O — snapshot caching and refresh live in
//! `praxis-store`, which calls [`decide`] / [`decide_with_context`] against
//! whatever snapshot is currently installed.
//!
//! ## Semantics
//!
//! - Absence of any applicable grant is a deny (fail-closed default).
//! - An applicable DENY beats any applicable ALLOW.
//! - `manage` on a resource stands in for `read|create|update|delete`.
//! - A grant's conditions must all hold against the caller's context;
//!   missing fields and unknown operators fail closed.

pub mod conditions;
pub mod decision;
pub mod eval;

pub use decision::{Decision, DecisionReason};
pub use eval::{decide, decide_with_context, grant_targets, MANAGE_ACTION};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use praxis_contracts::{AccessContext, Effect, Operator, PermissionGrant};

    use crate::decision::DecisionReason;
    use crate::{decide, decide_with_context};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn allow(resource: &str, action: &str) -> PermissionGrant {
        PermissionGrant::new(resource, action, Effect::Allow)
    }

    fn deny(resource: &str, action: &str) -> PermissionGrant {
        PermissionGrant::new(resource, action, Effect::Deny)
    }

    // ── 1. unconditional allow ────────────────────────────────────────────────

    /// A snapshot holding only an unconditional ALLOW answers true for
    /// exactly that (resource, action) pair.
    #[test]
    fn test_unconditional_allow() {
        let grants = vec![allow("office-hours", "delete")];

        assert!(decide(&grants, "office-hours", "delete").is_allowed());
        assert!(!decide(&grants, "office-hours", "create").is_allowed());
        assert!(!decide(&grants, "doctors", "delete").is_allowed());
    }

    // ── 2. fail-closed default ────────────────────────────────────────────────

    /// With no applicable grant — including completely unknown vocabulary —
    /// the answer is false, not an error.
    #[test]
    fn test_fail_closed_default() {
        let grants = vec![allow("doctors", "read")];

        let d = decide(&grants, "doctors", "delete");
        assert!(!d.is_allowed());
        assert_eq!(d.reason, DecisionReason::NoMatchingGrant);

        // Unknown strings are not rejected; they just find no grant.
        assert!(!decide(&grants, "not-a-resource", "not-an-action").is_allowed());
        assert!(!decide(&[], "doctors", "read").is_allowed());
    }

    // ── 3. deny precedence ────────────────────────────────────────────────────

    /// When an unconditional ALLOW and an unconditional DENY both apply to
    /// the same pair, DENY wins regardless of declaration order.
    #[test]
    fn test_deny_beats_allow() {
        let allow_first = vec![allow("patients", "read"), deny("patients", "read")];
        let deny_first = vec![deny("patients", "read"), allow("patients", "read")];

        assert!(!decide(&allow_first, "patients", "read").is_allowed());
        assert!(!decide(&deny_first, "patients", "read").is_allowed());

        match decide(&allow_first, "patients", "read").reason {
            DecisionReason::DeniedBy { grant_index } => assert_eq!(grant_index, 1),
            other => panic!("expected DeniedBy, got {other:?}"),
        }
    }

    // ── 4. manage superset ────────────────────────────────────────────────────

    /// A lone `manage` ALLOW on a resource implies all four CRUD actions on
    /// that resource — and nothing on any other resource.
    #[test]
    fn test_manage_implies_crud() {
        let grants = vec![allow("appointments", "manage")];

        for action in ["read", "create", "update", "delete", "manage"] {
            assert!(
                decide(&grants, "appointments", action).is_allowed(),
                "manage should imply '{action}'"
            );
        }
        assert!(!decide(&grants, "doctors", "read").is_allowed());
    }

    /// A `manage` DENY revokes CRUD actions the same way — the superset rule
    /// is effect-agnostic.
    #[test]
    fn test_manage_deny_revokes_crud() {
        let grants = vec![allow("blogs", "update"), deny("blogs", "manage")];
        assert!(!decide(&grants, "blogs", "update").is_allowed());
    }

    // ── 5. condition evaluation ───────────────────────────────────────────────

    /// The row-level self-service case: "a doctor may update their own
    /// profile".  True with isSelf=true, false with isSelf=false, false
    /// with no context at all.
    #[test]
    fn test_is_self_condition_truth_table() {
        let grants = vec![
            PermissionGrant::new("doctors", "update", Effect::Allow)
                .with_condition("isSelf", Operator::Eq, true),
        ];

        let ctx_true = AccessContext::new().with("isSelf", true);
        let ctx_false = AccessContext::new().with("isSelf", false);
        let ctx_empty = AccessContext::new();

        assert!(decide_with_context(&grants, "doctors", "update", &ctx_true).is_allowed());
        assert!(!decide_with_context(&grants, "doctors", "update", &ctx_false).is_allowed());
        assert!(!decide_with_context(&grants, "doctors", "update", &ctx_empty).is_allowed());

        // The context-free form behaves like the empty context.
        assert!(!decide(&grants, "doctors", "update").is_allowed());
    }

    /// All of a grant's conditions must hold — one failing condition
    /// disqualifies the grant.
    #[test]
    fn test_conditions_are_anded() {
        let grants = vec![
            PermissionGrant::new("appointments", "update", Effect::Allow)
                .with_condition("isSelf", Operator::Eq, true)
                .with_condition("status", Operator::Ne, "completed"),
        ];

        let both = AccessContext::new().with("isSelf", true).with("status", "booked");
        let one = AccessContext::new().with("isSelf", true).with("status", "completed");

        assert!(decide_with_context(&grants, "appointments", "update", &both).is_allowed());
        assert!(!decide_with_context(&grants, "appointments", "update", &one).is_allowed());
    }

    /// A broad DENY with a narrow conditional ALLOW: the deny only bites
    /// when its own conditions hold.
    #[test]
    fn test_conditional_deny_applies_only_when_conditions_hold() {
        let grants = vec![
            allow("patients", "read"),
            PermissionGrant::new("patients", "read", Effect::Deny)
                .with_condition("isRestrictedRecord", Operator::Eq, true),
        ];

        let restricted = AccessContext::new().with("isRestrictedRecord", true);
        let ordinary = AccessContext::new().with("isRestrictedRecord", false);

        assert!(!decide_with_context(&grants, "patients", "read", &restricted).is_allowed());
        assert!(decide_with_context(&grants, "patients", "read", &ordinary).is_allowed());
        // With no context the deny's condition fails closed, so the
        // unconditional allow carries the day.
        assert!(decide(&grants, "patients", "read").is_allowed());
    }

    /// `in` and `contains` work end-to-end through the decision routine.
    #[test]
    fn test_membership_operators_through_decide() {
        let grants = vec![
            PermissionGrant::new("work-locations", "update", Effect::Allow)
                .with_condition("branch", Operator::In, json!(["downtown", "northside"])),
            PermissionGrant::new("appointments", "read", Effect::Allow)
                .with_condition("assignedDoctorIds", Operator::Contains, "dr-7"),
        ];

        let at_branch = AccessContext::new().with("branch", "downtown");
        let elsewhere = AccessContext::new().with("branch", "airport");
        assert!(decide_with_context(&grants, "work-locations", "update", &at_branch).is_allowed());
        assert!(!decide_with_context(&grants, "work-locations", "update", &elsewhere).is_allowed());

        let mine = AccessContext::new().with("assignedDoctorIds", json!(["dr-2", "dr-7"]));
        let not_mine = AccessContext::new().with("assignedDoctorIds", json!(["dr-2"]));
        assert!(decide_with_context(&grants, "appointments", "read", &mine).is_allowed());
        assert!(!decide_with_context(&grants, "appointments", "read", &not_mine).is_allowed());
    }

    // ── 6. idempotence ────────────────────────────────────────────────────────

    /// Deciding twice against the same grants and inputs yields the same
    /// decision — the routine is pure.
    #[test]
    fn test_decide_is_idempotent() {
        let grants = vec![
            allow("specialties", "read"),
            deny("specialties", "delete"),
            PermissionGrant::new("doctors", "update", Effect::Allow)
                .with_condition("isSelf", Operator::Eq, true),
        ];
        let ctx = AccessContext::new().with("isSelf", true);

        for (resource, action) in [
            ("specialties", "read"),
            ("specialties", "delete"),
            ("doctors", "update"),
            ("reviews", "read"),
        ] {
            let first = decide_with_context(&grants, resource, action, &ctx);
            let second = decide_with_context(&grants, resource, action, &ctx);
            assert_eq!(first, second, "decide must be pure for {resource}:{action}");
        }
    }

    // ── 7. unknown operator ───────────────────────────────────────────────────

    /// A grant whose condition uses an operator this client does not know
    /// can never apply — even when the context looks like it should match.
    #[test]
    fn test_unknown_operator_grant_never_applies() {
        let grants = vec![
            PermissionGrant::new("qna", "update", Effect::Allow)
                .with_condition("isSelf", Operator::Other("matches".into()), true),
        ];
        let ctx = AccessContext::new().with("isSelf", true);

        assert!(!decide_with_context(&grants, "qna", "update", &ctx).is_allowed());
    }
}
