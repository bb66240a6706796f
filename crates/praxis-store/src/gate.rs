//! The declarative gating primitive.
//!
//! Call sites should not re-derive boolean logic per feature — they bind a
//! `Gate` and let it decide whether their widget exists at all.  A gate is
//! render-or-nothing: it exposes no loading state; callers that care about
//! readiness check [`PermissionEvaluator::state`] separately.

use praxis_contracts::AccessContext;
use praxis_engine::Decision;

use crate::evaluator::PermissionEvaluator;

/// A (resource, action) gate bound to an evaluator, with optional row-level
/// context.
///
/// ```rust,ignore
/// let edit_button = evaluator
///     .gate("doctors", "update")
///     .with_context(AccessContext::new().with("isSelf", true))
///     .show(|| EditButton::new(doctor_id));
/// // edit_button: Option<EditButton> — None when not permitted.
/// ```
pub struct Gate<'a> {
    evaluator: &'a PermissionEvaluator,
    resource: &'a str,
    action: &'a str,
    context: Option<AccessContext>,
}

impl<'a> Gate<'a> {
    /// Bind a gate for the given (resource, action) pair.
    pub fn new(evaluator: &'a PermissionEvaluator, resource: &'a str, action: &'a str) -> Self {
        Self {
            evaluator,
            resource,
            action,
            context: None,
        }
    }

    /// Attach row-level context used to evaluate conditional grants.
    pub fn with_context(mut self, context: AccessContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Evaluate the gate now.
    pub fn allows(&self) -> bool {
        self.decision().is_allowed()
    }

    /// Evaluate the gate and keep the reason.
    pub fn decision(&self) -> Decision {
        match &self.context {
            Some(ctx) => self
                .evaluator
                .explain_with_context(self.resource, self.action, ctx),
            None => self.evaluator.explain(self.resource, self.action),
        }
    }

    /// Render-or-nothing: build the gated value only when permitted.
    ///
    /// The closure is not called on a denial, so gated widgets are never
    /// even constructed for principals who cannot use them.
    pub fn show<T>(&self, render: impl FnOnce() -> T) -> Option<T> {
        if self.allows() {
            Some(render())
        } else {
            None
        }
    }
}
