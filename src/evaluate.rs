use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::diagnostics::{DiagnosticSink, PassTimer, TracingSink};
use crate::settings::Settings;
use crate::{Action, Condition, ConditionError, EvaluationReport, Rule, RuleContext, RuleList, Verdict};

type ConditionListener = Box<dyn Fn(&RuleList, &RuleContext, &Rule) + Send + Sync>;
type ActionListener = Box<dyn Fn(&RuleList, &RuleContext, &Rule, &dyn Action) + Send + Sync>;

const UNKNOWN: &str = "unknown";

#[derive(Default)]
struct Listeners {
    evaluating: Vec<ConditionListener>,
    evaluated: Vec<ConditionListener>,
    applied: Vec<ActionListener>,
}

/// Runs a [`RuleList`] against a [`RuleContext`], isolating failures per rule.
///
/// A condition that fails with [`ConditionError::DependencyUnavailable`] only
/// skips its own rule (warning). Any other condition failure, and any action
/// failure, aborts the pass (error). Nothing is ever returned as an `Err`:
/// failures reach the [`DiagnosticSink`] and the context's `aborted` flag.
///
/// # Example
///
/// ```
/// use personalize::{RenderingReference, RuleContext, RuleEvaluator, RuleListBuilder, set_rendering, visit};
///
/// let rules = RuleListBuilder::new()
///     .rule("returning", |r| r.when(visit("pages").gte(3_i64)).then(set_rendering("hero-returning")))
///     .rule("fallback", |r| r.when(personalize::Expr::Const(true)).then(set_rendering("hero-default")))
///     .build();
///
/// // No tracker: the first rule is skipped, the fallback still applies.
/// let mut ctx = RuleContext::for_reference(RenderingReference::new("r-1", "hero"));
/// let executed = RuleEvaluator::new().run_first_match(&rules, &mut ctx);
///
/// assert_eq!(executed, 1);
/// assert_eq!(ctx.reference().unwrap().rendering_id, "hero-default");
/// ```
pub struct RuleEvaluator {
    settings: Settings,
    sink: Arc<dyn DiagnosticSink>,
    listeners: Listeners,
}

impl Default for RuleEvaluator {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl fmt::Debug for RuleEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEvaluator")
            .field("settings", &self.settings)
            .field("evaluating", &self.listeners.evaluating.len())
            .field("evaluated", &self.listeners.evaluated.len())
            .field("applied", &self.listeners.applied.len())
            .finish_non_exhaustive()
    }
}

impl RuleEvaluator {
    /// Evaluator with default settings that logs through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            sink: Arc::new(TracingSink),
            listeners: Listeners::default(),
        }
    }

    /// Route warnings and errors to `sink` instead of `tracing`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Called before each condition is evaluated.
    #[must_use]
    pub fn on_evaluating(
        mut self,
        f: impl Fn(&RuleList, &RuleContext, &Rule) + Send + Sync + 'static,
    ) -> Self {
        self.listeners.evaluating.push(Box::new(f));
        self
    }

    /// Called after a condition produced a verdict or was skipped for a
    /// missing dependency. Not called when the condition aborted the pass.
    #[must_use]
    pub fn on_evaluated(
        mut self,
        f: impl Fn(&RuleList, &RuleContext, &Rule) + Send + Sync + 'static,
    ) -> Self {
        self.listeners.evaluated.push(Box::new(f));
        self
    }

    /// Called after each action applied successfully.
    #[must_use]
    pub fn on_applied(
        mut self,
        f: impl Fn(&RuleList, &RuleContext, &Rule, &dyn Action) + Send + Sync + 'static,
    ) -> Self {
        self.listeners.applied.push(Box::new(f));
        self
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply the first matching rule. Returns 1 if a rule's actions all ran,
    /// else 0.
    pub fn run_first_match(&self, rules: &RuleList, ctx: &mut RuleContext) -> usize {
        self.evaluate(rules, ctx, true)
    }

    /// Evaluate `rules` in order against `ctx`.
    ///
    /// With `stop_on_first_match` the pass ends after the first rule whose
    /// actions all ran; otherwise every matching rule applies until the end
    /// of the list or an abort. Returns the number of rules whose actions all
    /// ran.
    pub fn evaluate(&self, rules: &RuleList, ctx: &mut RuleContext, stop_on_first_match: bool) -> usize {
        self.run(rules, ctx, stop_on_first_match, None)
    }

    /// Like [`evaluate`](Self::evaluate), returning a full report.
    pub fn evaluate_detailed(
        &self,
        rules: &RuleList,
        ctx: &mut RuleContext,
        stop_on_first_match: bool,
    ) -> EvaluationReport {
        let mut report = EvaluationReport::default();
        let executed = self.run(rules, ctx, stop_on_first_match, Some(&mut report));
        report.executed = executed;
        report.aborted = ctx.is_aborted();
        report
    }

    fn run(
        &self,
        rules: &RuleList,
        ctx: &mut RuleContext,
        stop_on_first_match: bool,
        mut report: Option<&mut EvaluationReport>,
    ) -> usize {
        if rules.is_empty() || ctx.is_aborted() {
            return 0;
        }

        let source = rules.name().unwrap_or(self.settings.source());
        let timer = PassTimer::start(self.settings.threshold(), source, &*self.sink);
        debug!(source, rules = rules.len(), stop_on_first_match, "evaluating rule list");

        let mut executed = 0;
        'rules: for rule in rules {
            let Some(condition) = rule.condition() else {
                continue;
            };

            let verdict = self.check(rules, ctx, rule, condition, source);
            if ctx.is_aborted() {
                break;
            }

            let Some(verdict) = verdict else {
                ctx.set_skip_rule(false);
                if let Some(report) = report.as_deref_mut() {
                    report.skipped.push(rule.name().unwrap_or(UNKNOWN).to_owned());
                }
                continue;
            };
            if verdict != Verdict::Match || ctx.skip_rule() {
                ctx.set_skip_rule(false);
                continue;
            }

            for action in rule.actions() {
                match action.apply(ctx) {
                    Ok(()) => {
                        for listener in &self.listeners.applied {
                            listener(rules, &*ctx, rule, &**action);
                        }
                    }
                    Err(err) => {
                        let message = format!(
                            "action execution failed: rule '{}', action '{}'",
                            rule.name().unwrap_or(UNKNOWN),
                            action.unique_id().unwrap_or(UNKNOWN),
                        );
                        self.sink.error(&message, &err, source);
                        ctx.abort();
                    }
                }
                if ctx.is_aborted() {
                    break 'rules;
                }
            }

            executed += 1;
            if let Some(report) = report.as_deref_mut() {
                report.matched.push(rule.name().unwrap_or(UNKNOWN).to_owned());
            }
            if stop_on_first_match {
                break;
            }
        }

        if let Some(report) = report {
            report.duration = timer.elapsed();
        }
        debug!(source, executed, aborted = ctx.is_aborted(), "rule list evaluated");
        executed
    }

    /// Evaluate one condition, classifying failures. `None` means the rule
    /// has no verdict: either a dependency was missing or the pass aborted.
    fn check(
        &self,
        rules: &RuleList,
        ctx: &mut RuleContext,
        rule: &Rule,
        condition: &dyn Condition,
        source: &str,
    ) -> Option<Verdict> {
        for listener in &self.listeners.evaluating {
            listener(rules, &*ctx, rule);
        }

        let verdict = match condition.evaluate(ctx) {
            Ok(Verdict::Abstain) => None,
            Ok(verdict) => Some(verdict),
            Err(err @ ConditionError::DependencyUnavailable { .. }) => {
                let message = format!(
                    "{err}; rule '{}' skipped, condition '{}'",
                    rule.name().unwrap_or(UNKNOWN),
                    rule.condition_id().unwrap_or(UNKNOWN),
                );
                self.sink.warn(&message, &err, source);
                None
            }
            Err(err) => {
                let message = format!(
                    "condition evaluation failed: rule '{}', condition '{}'",
                    rule.name().unwrap_or(UNKNOWN),
                    rule.condition_id().unwrap_or(UNKNOWN),
                );
                self.sink.error(&message, &err, source);
                ctx.abort();
                return None;
            }
        };

        for listener in &self.listeners.evaluated {
            listener(rules, &*ctx, rule);
        }
        verdict
    }
}
