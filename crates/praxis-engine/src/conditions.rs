//! Condition matching against a caller-supplied context.
//!
//! Every branch here fails closed: a missing context field, a non-array
//! value where an array is required, and an operator this client does not
//! recognize all evaluate to *no match*.

use tracing::{debug, warn};

use praxis_contracts::{AccessContext, Condition, Operator, PermissionGrant};

/// Return true if every condition on `grant` holds against `ctx`.
///
/// An unconditional grant trivially holds.  AND semantics: one failing
/// condition disqualifies the grant.
pub fn conditions_hold(grant: &PermissionGrant, ctx: &AccessContext) -> bool {
    grant.conditions.iter().all(|c| condition_holds(c, ctx))
}

/// Evaluate a single condition against the context.
///
/// Operator semantics:
/// - `eq` / `ne`: strict JSON equality / inequality.
/// - `in`: the context value is a member of the condition's array value.
/// - `contains`: the condition value is a member of the array-valued
///   context field.
pub fn condition_holds(condition: &Condition, ctx: &AccessContext) -> bool {
    let Some(actual) = ctx.get(&condition.field) else {
        debug!(
            field = %condition.field,
            "condition references a field absent from the context; failing closed"
        );
        return false;
    };

    match &condition.operator {
        Operator::Eq => actual == &condition.value,
        Operator::Ne => actual != &condition.value,
        Operator::In => match condition.value.as_array() {
            Some(expected) => expected.contains(actual),
            None => {
                warn!(
                    field = %condition.field,
                    "'in' condition value is not an array; failing closed"
                );
                false
            }
        },
        Operator::Contains => match actual.as_array() {
            Some(members) => members.contains(&condition.value),
            None => {
                debug!(
                    field = %condition.field,
                    "'contains' context field is not an array; failing closed"
                );
                false
            }
        },
        Operator::Other(name) => {
            warn!(
                operator = %name,
                field = %condition.field,
                "unknown condition operator; failing closed"
            );
            false
        }
    }
}
