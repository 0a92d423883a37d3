mod action;
mod error;
mod evaluation_report;
mod expr;
mod parameters;
mod reference;
mod rule;
mod rule_context;
mod rule_list;
mod tracker;
mod value;
mod verdict;

pub use action::{hide, set_datasource, set_rendering, HideRendering, SetDatasource, SetRendering};
pub use error::{ActionError, ConditionError};
pub use evaluation_report::EvaluationReport;
pub use expr::{field, visit, CompareOp, Expr, FieldExpr, TRACKER_FACILITY};
pub use parameters::Parameters;
pub use reference::{ContentItem, RenderingReference};
pub use rule::{action_fn, condition_fn, Action, Condition, FnAction, FnCondition, Rule, RuleBuilder};
pub use rule_context::RuleContext;
pub use rule_list::{RuleList, RuleListBuilder};
pub use tracker::Tracker;
pub use value::Value;
pub use verdict::Verdict;
