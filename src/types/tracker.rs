use super::{Parameters, Value};

/// Ambient per-visitor tracking facility.
///
/// A [`RuleContext`](super::RuleContext) may or may not carry one: bots and
/// visitors with tracking disabled have none. Conditions that need visit data
/// report [`ConditionError::DependencyUnavailable`](super::ConditionError)
/// when it is absent.
pub trait Tracker: Send + Sync {
    /// Look up a visit attribute such as `"pages"` or `"goals.newsletter"`.
    fn get(&self, key: &str) -> Option<Value>;
}

impl Tracker for Parameters {
    fn get(&self, key: &str) -> Option<Value> {
        Parameters::get(self, key).cloned()
    }
}
