use std::fmt;
use std::ops::Not;

use super::{Condition, ConditionError, RuleContext, Value, Verdict};

/// Facility name reported when a visit comparison runs without a tracker.
pub const TRACKER_FACILITY: &str = "tracker";

/// Comparison operators supported in rule expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Composable condition over a [`RuleContext`].
///
/// `Compare` reads the context parameters, `Visit` reads the visitor tracker.
/// A missing parameter or an incomparable value is simply false; a `Visit`
/// node evaluated without a tracker fails with
/// [`ConditionError::DependencyUnavailable`]. `And`/`Or` short-circuit, so a
/// visit comparison guarded by a false left operand never needs the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(bool),
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    Visit {
        key: String,
        op: CompareOp,
        value: Value,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(b) => write!(f, "{b}"),
            Expr::Compare { field, op, value } => write!(f, "({field} {op} {value})"),
            Expr::Visit { key, op, value } => write!(f, "(visit.{key} {op} {value})"),
            Expr::And(a, b) => write!(f, "({a} AND {b})"),
            Expr::Or(a, b) => write!(f, "({a} OR {b})"),
            Expr::Not(inner) => write!(f, "(NOT {inner})"),
        }
    }
}

impl Expr {
    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    /// Whether any node of this expression reads the visitor tracker.
    #[must_use]
    pub fn needs_tracker(&self) -> bool {
        match self {
            Expr::Visit { .. } => true,
            Expr::And(a, b) | Expr::Or(a, b) => a.needs_tracker() || b.needs_tracker(),
            Expr::Not(inner) => inner.needs_tracker(),
            Expr::Const(_) | Expr::Compare { .. } => false,
        }
    }

    fn eval(&self, ctx: &RuleContext) -> Result<bool, ConditionError> {
        match self {
            Expr::Const(b) => Ok(*b),
            Expr::Compare { field, op, value } => Ok(ctx
                .parameters()
                .get(field)
                .and_then(|v| v.compare(*op, value))
                .unwrap_or(false)),
            Expr::Visit { key, op, value } => {
                let tracker = ctx
                    .tracker()
                    .ok_or_else(|| ConditionError::dependency_unavailable(TRACKER_FACILITY))?;
                Ok(tracker
                    .get(key)
                    .and_then(|v| v.compare(*op, value))
                    .unwrap_or(false))
            }
            Expr::And(a, b) => Ok(a.eval(ctx)? && b.eval(ctx)?),
            Expr::Or(a, b) => Ok(a.eval(ctx)? || b.eval(ctx)?),
            Expr::Not(inner) => Ok(!inner.eval(ctx)?),
        }
    }
}

impl Condition for Expr {
    fn evaluate(&self, ctx: &mut RuleContext) -> Result<Verdict, ConditionError> {
        self.eval(ctx).map(Verdict::from)
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Parameter,
    Visit,
}

/// Intermediate builder for comparison expressions.
/// Created by [`field()`] or [`visit()`].
#[derive(Debug, Clone)]
pub struct FieldExpr {
    source: Source,
    path: String,
}

impl FieldExpr {
    fn build(self, op: CompareOp, value: Value) -> Expr {
        match self.source {
            Source::Parameter => Expr::Compare {
                field: self.path,
                op,
                value,
            },
            Source::Visit => Expr::Visit {
                key: self.path,
                op,
                value,
            },
        }
    }

    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Expr {
        self.build(CompareOp::Eq, value.into())
    }

    #[must_use]
    pub fn neq(self, value: impl Into<Value>) -> Expr {
        self.build(CompareOp::Neq, value.into())
    }

    #[must_use]
    pub fn gt(self, value: impl Into<Value>) -> Expr {
        self.build(CompareOp::Gt, value.into())
    }

    #[must_use]
    pub fn gte(self, value: impl Into<Value>) -> Expr {
        self.build(CompareOp::Gte, value.into())
    }

    #[must_use]
    pub fn lt(self, value: impl Into<Value>) -> Expr {
        self.build(CompareOp::Lt, value.into())
    }

    #[must_use]
    pub fn lte(self, value: impl Into<Value>) -> Expr {
        self.build(CompareOp::Lte, value.into())
    }
}

/// Compare a context parameter.
#[must_use]
pub fn field(path: &str) -> FieldExpr {
    FieldExpr {
        source: Source::Parameter,
        path: path.to_owned(),
    }
}

/// Compare a visit attribute read from the tracker.
#[must_use]
pub fn visit(key: &str) -> FieldExpr {
    FieldExpr {
        source: Source::Visit,
        path: key.to_owned(),
    }
}
