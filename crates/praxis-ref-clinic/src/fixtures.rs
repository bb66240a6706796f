//! Simulated clinic permission data for the reference scenarios.
//!
//! All grants in this module are hardcoded and fictional, modeled on the
//! admin dashboard's resource vocabulary: doctors, staff, patients,
//! appointments, specialties, work-locations, office-hours, blogs, qna,
//! reviews, and the permission admin screens.  This module stands in for
//! the permission service a production deployment would call.

use praxis_contracts::{Effect, Operator, PermissionGrant, PrincipalId};

/// Principal used by the physician scenarios.
pub fn physician_principal() -> PrincipalId {
    PrincipalId::new("dr-ayana-okafor")
}

/// Principal used by the front-desk scenarios.
pub fn front_desk_principal() -> PrincipalId {
    PrincipalId::new("fd-marisol-reyes")
}

/// Principal used by the practice-admin scenarios.
pub fn practice_admin_principal() -> PrincipalId {
    PrincipalId::new("admin-theo-lindqvist")
}

/// Grants for a staff physician.
///
/// Read access across the clinical screens, self-service writes on their
/// own profile and office hours, and an explicit deny on the permission
/// admin screens even though broad read grants exist elsewhere.
pub fn physician_grants() -> Vec<PermissionGrant> {
    vec![
        PermissionGrant::new("doctors", "read", Effect::Allow),
        PermissionGrant::new("patients", "read", Effect::Allow),
        PermissionGrant::new("appointments", "read", Effect::Allow),
        PermissionGrant::new("specialties", "read", Effect::Allow),
        PermissionGrant::new("work-locations", "read", Effect::Allow),
        PermissionGrant::new("blogs", "read", Effect::Allow),
        PermissionGrant::new("qna", "read", Effect::Allow),
        PermissionGrant::new("reviews", "read", Effect::Allow),
        // Self-service: a doctor may edit their own profile and hours only.
        PermissionGrant::new("doctors", "update", Effect::Allow)
            .with_condition("isSelf", Operator::Eq, true),
        PermissionGrant::new("office-hours", "manage", Effect::Allow)
            .with_condition("isSelf", Operator::Eq, true),
        // Q&A answers may be edited by their author.
        PermissionGrant::new("qna", "update", Effect::Allow)
            .with_condition("isAuthor", Operator::Eq, true),
        PermissionGrant::new("permissions", "manage", Effect::Deny),
    ]
}

/// Grants for a front-desk staff member.
///
/// Full appointment management plus read access to the directories needed
/// to book: doctors, patients, specialties, work locations.  Content
/// screens (blogs, Q&A, reviews) are absent entirely — fail-closed.
pub fn front_desk_grants() -> Vec<PermissionGrant> {
    vec![
        PermissionGrant::new("appointments", "manage", Effect::Allow),
        PermissionGrant::new("doctors", "read", Effect::Allow),
        PermissionGrant::new("patients", "read", Effect::Allow),
        PermissionGrant::new("patients", "create", Effect::Allow),
        PermissionGrant::new("specialties", "read", Effect::Allow),
        PermissionGrant::new("work-locations", "read", Effect::Allow),
        PermissionGrant::new("office-hours", "read", Effect::Allow),
    ]
}

/// Grants for a practice administrator.
///
/// `manage` across the dashboard, with one deliberate carve-out: the audit
/// log can be read via `manage` but a standing unconditional DENY blocks
/// deletion, demonstrating DENY-over-ALLOW precedence.
pub fn practice_admin_grants() -> Vec<PermissionGrant> {
    vec![
        PermissionGrant::new("doctors", "manage", Effect::Allow),
        PermissionGrant::new("staff", "manage", Effect::Allow),
        PermissionGrant::new("patients", "manage", Effect::Allow),
        PermissionGrant::new("appointments", "manage", Effect::Allow),
        PermissionGrant::new("specialties", "manage", Effect::Allow),
        PermissionGrant::new("work-locations", "manage", Effect::Allow),
        PermissionGrant::new("blogs", "manage", Effect::Allow),
        PermissionGrant::new("qna", "manage", Effect::Allow),
        PermissionGrant::new("reviews", "manage", Effect::Allow),
        PermissionGrant::new("permissions", "manage", Effect::Allow),
        PermissionGrant::new("audit-log", "manage", Effect::Allow),
        PermissionGrant::new("audit-log", "delete", Effect::Deny),
    ]
}
