use std::fmt;
use std::time::Duration;

/// Detailed outcome of one pass, returned by
/// [`RuleEvaluator::evaluate_detailed()`](crate::RuleEvaluator::evaluate_detailed).
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct EvaluationReport {
    pub(crate) executed: usize,
    pub(crate) matched: Vec<String>,
    pub(crate) skipped: Vec<String>,
    pub(crate) aborted: bool,
    pub(crate) duration: Duration,
}

impl EvaluationReport {
    /// Number of rules whose actions all ran.
    #[must_use]
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Names of rules whose actions all ran, in evaluation order. Unnamed
    /// rules appear as `"unknown"`.
    #[must_use]
    pub fn matched(&self) -> &[String] {
        &self.matched
    }

    /// Names of rules passed over without a verdict: the condition abstained
    /// or a dependency it needs was unavailable.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Whether the pass ended early on an unexpected failure or abort.
    #[must_use]
    pub fn aborted(&self) -> bool {
        self.aborted
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "executed: {}", self.executed)?;
        write!(f, ", matched: [{}]", self.matched.join(", "))?;
        if !self.skipped.is_empty() {
            write!(f, ", skipped: [{}]", self.skipped.join(", "))?;
        }
        if self.aborted {
            write!(f, ", aborted")?;
        }
        write!(f, ", duration: {:?}", self.duration)
    }
}
