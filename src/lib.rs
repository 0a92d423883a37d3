//! Fault-isolating conditional rendering rules.
//!
//! A [`RuleList`] is an ordered list of condition/action rules. The
//! [`RuleEvaluator`] runs it against a [`RuleContext`] describing one
//! rendering placement; a [`Personalizer`] looks up the rules for a
//! rendering, runs them once per request and records what to render.
//!
//! A condition that needs the visitor [`Tracker`] when none is present only
//! skips its own rule. Any other failure aborts the pass. Either way the
//! failure is reported to a [`DiagnosticSink`] and never propagates to the
//! caller.
//!
//! ```
//! use personalize::{
//!     ContentItem, CustomizationState, InMemoryRuleSource, PageContext, Parameters,
//!     Personalizer, RenderingReference, Renderer, RuleListBuilder, field, set_rendering, visit,
//! };
//!
//! let rules = RuleListBuilder::new()
//!     .rule("Returning", |r| r.when(visit("pages").gte(3_i64)).then(set_rendering("hero-returning")))
//!     .rule("Mobile", |r| r.when(field("device").eq("mobile")).then(set_rendering("hero-mobile")))
//!     .build();
//!
//! let personalizer = Personalizer::new(InMemoryRuleSource::new().with("r-1", rules));
//! let page = PageContext {
//!     item: Some(ContentItem::new("home", "/home", "en")),
//!     language: "en".into(),
//!     database: "web".into(),
//! };
//! let mut state = CustomizationState::new(RenderingReference::new("r-1", "hero"), page)
//!     .with_parameters(Parameters::new().with("device", "mobile"));
//!
//! personalizer.process(&mut state);
//! assert!(state.is_customized());
//! assert_eq!(state.rendering().rendering_id, "hero-mobile");
//! assert!(matches!(state.renderer(), Some(Renderer::Rendering(_))));
//! ```

mod diagnostics;
mod evaluate;
mod personalize;
mod settings;
mod types;

pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, Severity, TracingSink};
pub use evaluate::RuleEvaluator;
pub use personalize::{
    AuditPipeline, CustomizationState, InMemoryRuleSource, PageContext, Personalizer, Renderer,
    RuleSource,
};
pub use settings::{Settings, DEFAULT_LONG_RUNNING_THRESHOLD};
pub use types::{
    action_fn, condition_fn, field, hide, set_datasource, set_rendering, visit, Action,
    ActionError, CompareOp, Condition, ConditionError, ContentItem, EvaluationReport, Expr,
    FieldExpr, FnAction, FnCondition, HideRendering, Parameters, RenderingReference, Rule,
    RuleBuilder, RuleContext, RuleList, RuleListBuilder, SetDatasource, SetRendering, Tracker,
    Value, Verdict, TRACKER_FACILITY,
};
