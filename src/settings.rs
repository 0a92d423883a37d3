use std::time::Duration;

/// Default threshold above which a pass is reported as long-running.
pub const DEFAULT_LONG_RUNNING_THRESHOLD: Duration = Duration::from_millis(100);

/// Evaluator tuning.
///
/// ```
/// use std::time::Duration;
/// use personalize::Settings;
///
/// let settings = Settings::new().long_running_threshold(Duration::from_millis(20));
/// assert_eq!(settings.threshold(), Duration::from_millis(20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    long_running_threshold: Duration,
    source: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            long_running_threshold: DEFAULT_LONG_RUNNING_THRESHOLD,
            source: "personalize".to_owned(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Passes slower than this are logged at warning level.
    #[must_use]
    pub fn long_running_threshold(mut self, threshold: Duration) -> Self {
        self.long_running_threshold = threshold;
        self
    }

    /// Diagnostic source used for rule lists that have no name.
    #[must_use]
    pub fn default_source(mut self, source: &str) -> Self {
        source.clone_into(&mut self.source);
        self
    }

    #[must_use]
    pub fn threshold(&self) -> Duration {
        self.long_running_threshold
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.threshold(), DEFAULT_LONG_RUNNING_THRESHOLD);
        assert_eq!(s.source(), "personalize");
    }

    #[test]
    fn overrides() {
        let s = Settings::new()
            .long_running_threshold(Duration::ZERO)
            .default_source("hero");
        assert_eq!(s.threshold(), Duration::ZERO);
        assert_eq!(s.source(), "hero");
    }
}
