use thiserror::Error;

/// Failure raised while evaluating a condition.
///
/// The evaluator treats the two variants differently: a missing ambient
/// facility only skips the rule, anything else aborts the pass.
#[derive(Debug, Error)]
pub enum ConditionError {
    /// An optional ambient facility (e.g. the visitor tracker) is absent, so
    /// the condition has no answer for this visitor.
    #[error("{facility} is not available")]
    DependencyUnavailable { facility: String },

    #[error("condition evaluation failed: {message}")]
    Evaluation { message: String },
}

impl ConditionError {
    #[must_use]
    pub fn dependency_unavailable(facility: &str) -> Self {
        Self::DependencyUnavailable {
            facility: facility.to_owned(),
        }
    }

    #[must_use]
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_dependency_unavailable(&self) -> bool {
        matches!(self, Self::DependencyUnavailable { .. })
    }
}

/// Failure raised while applying an action. Always aborts the pass.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("rendering '{unique_id}' is no longer among the candidates")]
    MissingReference { unique_id: String },

    #[error("action failed: {message}")]
    Failed { message: String },
}

impl ActionError {
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_unavailable_message() {
        let err = ConditionError::dependency_unavailable("tracker");
        assert_eq!(err.to_string(), "tracker is not available");
        assert!(err.is_dependency_unavailable());
    }

    #[test]
    fn evaluation_message() {
        let err = ConditionError::evaluation("geo lookup timed out");
        assert_eq!(
            err.to_string(),
            "condition evaluation failed: geo lookup timed out"
        );
        assert!(!err.is_dependency_unavailable());
    }

    #[test]
    fn evaluation_mentioning_tracker_is_still_an_evaluation_error() {
        let err = ConditionError::evaluation("Tracker returned malformed profile");
        assert!(!err.is_dependency_unavailable());
    }

    #[test]
    fn missing_reference_message() {
        let err = ActionError::MissingReference {
            unique_id: "r-1".into(),
        };
        assert_eq!(
            err.to_string(),
            "rendering 'r-1' is no longer among the candidates"
        );
    }

    #[test]
    fn failed_message() {
        assert_eq!(
            ActionError::failed("datasource locked").to_string(),
            "action failed: datasource locked"
        );
    }
}
