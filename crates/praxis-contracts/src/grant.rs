//! Grant, effect, operator, and condition types.
//!
//! These mirror the JSON the permission service emits: an ordered array of
//! `{resource, action, effect, conditions}` entries.  The shapes here are
//! wire-faithful; evaluation semantics (the `manage` superset, deny
//! precedence, condition matching) live in `praxis-engine`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a grant permits or revokes the (resource, action) it names.
///
/// The backend emits upper-case string values:
/// ```json
/// "effect": "ALLOW"
/// "effect": "DENY"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
    Allow,
    Deny,
}

/// Comparison operator of a [`Condition`].
///
/// The four operators the permission service emits today are modeled as
/// named variants.  Anything else deserializes into `Other` so that a newer
/// server cannot break an older client: an `Other` operator never matches,
/// which keeps unknown conditions fail-closed instead of silently allowing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    /// Strict equality between the context value and the condition value.
    Eq,
    /// Strict inequality.
    Ne,
    /// The context value is a member of the condition's array value.
    In,
    /// The condition value is a member of the array-valued context field.
    Contains,
    /// An operator this client does not understand.  Never matches.
    Other(String),
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        match s.as_str() {
            "eq" => Operator::Eq,
            "ne" => Operator::Ne,
            "in" => Operator::In,
            "contains" => Operator::Contains,
            _ => Operator::Other(s),
        }
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Eq => "eq".to_string(),
            Operator::Ne => "ne".to_string(),
            Operator::In => "in".to_string(),
            Operator::Contains => "contains".to_string(),
            Operator::Other(s) => s,
        }
    }
}

/// One predicate attached to a grant.
///
/// `field` names a key in the caller-supplied [`AccessContext`]; `value` is
/// whatever JSON the rule author stored.  All of a grant's conditions must
/// hold (AND semantics) for the grant to apply.
///
/// [`AccessContext`]: crate::context::AccessContext
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

/// A single authorization rule for the current principal.
///
/// Example wire form:
/// ```json
/// {
///   "resource": "doctors",
///   "action": "update",
///   "effect": "ALLOW",
///   "conditions": [{ "field": "isSelf", "operator": "eq", "value": true }]
/// }
/// ```
///
/// Several grants for the same (resource, action) pair may coexist — e.g. a
/// broad DENY next to a narrow conditional ALLOW.  Precedence between them
/// is the engine's concern, not the data's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// The protected entity type, e.g. `"doctors"` or `"office-hours"`.
    pub resource: String,

    /// The operation, e.g. `"read"`, `"create"`, `"update"`, `"delete"`,
    /// or the superset action `"manage"`.
    pub action: String,

    /// Whether this grant allows or denies.
    pub effect: Effect,

    /// Predicates that must all hold for the grant to apply.  Empty means
    /// the grant is unconditional.
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl PermissionGrant {
    /// Build an unconditional grant.
    pub fn new(resource: impl Into<String>, action: impl Into<String>, effect: Effect) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            effect,
            conditions: Vec::new(),
        }
    }

    /// Attach a condition, consuming and returning the grant (builder style).
    pub fn with_condition(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            operator,
            value: value.into(),
        });
        self
    }

    /// Return true if this grant carries no conditions.
    pub fn is_unconditional(&self) -> bool {
        self.conditions.is_empty()
    }
}
