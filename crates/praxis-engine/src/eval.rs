//! The evaluation algorithm.
//!
//! One shared routine decides every authorization question in the system:
//!
//! 1. A grant targets the query when its resource matches exactly and its
//!    action is either the queried action or the superset action `manage`.
//! 2. Among targeting grants, only those whose conditions all hold against
//!    the supplied context apply.
//! 3. Any applicable DENY wins over any applicable ALLOW.
//! 4. No applicable grant means deny — the fail-closed default.
//!
//! The routine is pure and synchronous: no I/O, no allocation beyond the
//! returned `Decision`, deterministic for a fixed grant slice.

use tracing::debug;

use praxis_contracts::{AccessContext, Effect, PermissionGrant};

use crate::conditions::conditions_hold;
use crate::decision::Decision;

/// The superset action: a grant of `manage` on a resource stands in for
/// `read`, `create`, `update`, and `delete` on that resource.
///
/// This is a policy-level rule applied here, in the one shared routine — it
/// is never encoded per grant.
pub const MANAGE_ACTION: &str = "manage";

/// Return true if `grant` targets the queried (resource, action) pair,
/// ignoring conditions.
///
/// Resources match exactly (case-sensitive).  Actions match exactly, or via
/// the [`MANAGE_ACTION`] superset.
pub fn grant_targets(grant: &PermissionGrant, resource: &str, action: &str) -> bool {
    grant.resource == resource && (grant.action == action || grant.action == MANAGE_ACTION)
}

/// Decide a context-free query.
///
/// Equivalent to [`decide_with_context`] with an empty context: conditional
/// grants fail closed because their fields are absent.
pub fn decide(grants: &[PermissionGrant], resource: &str, action: &str) -> Decision {
    static EMPTY: std::sync::OnceLock<AccessContext> = std::sync::OnceLock::new();
    decide_with_context(grants, resource, action, EMPTY.get_or_init(AccessContext::new))
}

/// Decide a query with caller-supplied context.
///
/// Unknown resource or action strings are not rejected — they simply match
/// no grant and come back denied.  Never panics, never errors.
pub fn decide_with_context(
    grants: &[PermissionGrant],
    resource: &str,
    action: &str,
    ctx: &AccessContext,
) -> Decision {
    let mut allowed_by: Option<usize> = None;

    for (index, grant) in grants.iter().enumerate() {
        if !grant_targets(grant, resource, action) {
            continue;
        }
        if !conditions_hold(grant, ctx) {
            continue;
        }

        match grant.effect {
            // DENY precedence: one applicable deny settles the query no
            // matter how many allows also apply.
            Effect::Deny => {
                debug!(resource, action, grant_index = index, "denied by grant");
                return Decision::denied_by(index);
            }
            Effect::Allow => {
                if allowed_by.is_none() {
                    allowed_by = Some(index);
                }
            }
        }
    }

    match allowed_by {
        Some(index) => Decision::allowed_by(index),
        None => {
            debug!(resource, action, "no grant applied; denying by default");
            Decision::no_matching_grant()
        }
    }
}
