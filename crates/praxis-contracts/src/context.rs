//! Caller-supplied evaluation context.
//!
//! Conditional grants reference fields like `isSelf` that only the call site
//! knows.  `AccessContext` is the closed map those fields are read from: the
//! engine never reaches outside it, and a field a condition names but the
//! context lacks evaluates to false (fail-closed).

use std::collections::BTreeMap;

use serde_json::Value;

/// Key/value data supplied by a UI call site for condition evaluation.
///
/// Values use the same JSON value space the permission service uses for
/// condition values, so comparisons are like-for-like.
///
/// ```rust,ignore
/// let ctx = AccessContext::new()
///     .with("isSelf", true)
///     .with("departmentId", "cardiology");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessContext {
    fields: BTreeMap<String, Value>,
}

impl AccessContext {
    /// An empty context.  Every conditional grant fails to apply against it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one field, consuming and returning the context (builder style).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Look up a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Return true if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over the field names this context carries.
    ///
    /// Useful together with
    /// [`PermissionSnapshot::referenced_context_fields`] to spot call sites
    /// passing fields no loaded grant will ever read.
    ///
    /// [`PermissionSnapshot::referenced_context_fields`]:
    ///     crate::snapshot::PermissionSnapshot::referenced_context_fields
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
