use std::fmt;
use std::sync::Arc;

use super::{ActionError, ConditionError, RuleContext, Verdict};

/// Predicate half of a rule.
///
/// Conditions may flag the context with [`RuleContext::set_skip_rule`] or
/// [`RuleContext::abort`]; the evaluator honours both after the call returns.
pub trait Condition: Send + Sync {
    /// Evaluate against the context.
    ///
    /// # Errors
    ///
    /// [`ConditionError::DependencyUnavailable`] when an optional ambient
    /// facility is absent; [`ConditionError::Evaluation`] for anything else.
    fn evaluate(&self, ctx: &mut RuleContext) -> Result<Verdict, ConditionError>;

    /// Identifier used in diagnostics.
    fn unique_id(&self) -> Option<&str> {
        None
    }
}

/// Effect half of a rule. Applied only when the rule's condition matched.
pub trait Action: Send + Sync {
    /// Apply this action to the context.
    ///
    /// # Errors
    ///
    /// Any [`ActionError`]; the evaluator aborts the pass.
    fn apply(&self, ctx: &mut RuleContext) -> Result<(), ActionError>;

    /// Identifier used in diagnostics.
    fn unique_id(&self) -> Option<&str> {
        None
    }
}

/// A condition and its ordered actions.
///
/// A rule without a condition is incomplete and is skipped by the evaluator.
/// Cloning is cheap: conditions and actions are shared.
#[derive(Clone, Default)]
pub struct Rule {
    name: Option<String>,
    condition: Option<Arc<dyn Condition>>,
    condition_id: Option<String>,
    actions: Vec<Arc<dyn Action>>,
}

impl Rule {
    /// Start building a rule.
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder {
            rule: Rule::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn condition(&self) -> Option<&dyn Condition> {
        self.condition.as_deref()
    }

    /// Identifier of the condition: the one set on the builder, else the one
    /// the condition reports.
    #[must_use]
    pub fn condition_id(&self) -> Option<&str> {
        self.condition_id
            .as_deref()
            .or_else(|| self.condition.as_deref().and_then(|c| c.unique_id()))
    }

    #[must_use]
    pub fn actions(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("has_condition", &self.condition.is_some())
            .field("condition_id", &self.condition_id())
            .field("actions", &self.actions.len())
            .finish()
    }
}

/// Builder passed to [`RuleListBuilder::rule`](super::RuleListBuilder::rule).
#[must_use]
pub struct RuleBuilder {
    rule: Rule,
}

impl RuleBuilder {
    pub fn named(mut self, name: &str) -> Self {
        self.rule.name = Some(name.to_owned());
        self
    }

    /// Set the condition.
    pub fn when(mut self, condition: impl Condition + 'static) -> Self {
        self.rule.condition = Some(Arc::new(condition));
        self
    }

    /// Identify the condition in diagnostics.
    pub fn condition_id(mut self, id: &str) -> Self {
        self.rule.condition_id = Some(id.to_owned());
        self
    }

    /// Append an action.
    pub fn then(mut self, action: impl Action + 'static) -> Self {
        self.rule.actions.push(Arc::new(action));
        self
    }

    #[must_use]
    pub fn build(self) -> Rule {
        self.rule
    }
}

/// Condition backed by a closure.
pub struct FnCondition<F> {
    id: Option<String>,
    f: F,
}

impl<F> Condition for FnCondition<F>
where
    F: Fn(&mut RuleContext) -> Result<Verdict, ConditionError> + Send + Sync,
{
    fn evaluate(&self, ctx: &mut RuleContext) -> Result<Verdict, ConditionError> {
        (self.f)(ctx)
    }

    fn unique_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Action backed by a closure.
pub struct FnAction<F> {
    id: Option<String>,
    f: F,
}

impl<F> Action for FnAction<F>
where
    F: Fn(&mut RuleContext) -> Result<(), ActionError> + Send + Sync,
{
    fn apply(&self, ctx: &mut RuleContext) -> Result<(), ActionError> {
        (self.f)(ctx)
    }

    fn unique_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Wrap a closure as a [`Condition`] with the given diagnostic id.
#[must_use]
pub fn condition_fn<F>(id: &str, f: F) -> FnCondition<F>
where
    F: Fn(&mut RuleContext) -> Result<Verdict, ConditionError> + Send + Sync,
{
    FnCondition {
        id: Some(id.to_owned()),
        f,
    }
}

/// Wrap a closure as an [`Action`] with the given diagnostic id.
#[must_use]
pub fn action_fn<F>(id: &str, f: F) -> FnAction<F>
where
    F: Fn(&mut RuleContext) -> Result<(), ActionError> + Send + Sync,
{
    FnAction {
        id: Some(id.to_owned()),
        f,
    }
}
