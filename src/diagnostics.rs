//! Where the evaluator reports failures, and the long-running pass timer.

use std::error::Error;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Receiver for the two failure classes the evaluator distinguishes, and
/// for passes that ran longer than the configured threshold.
///
/// `source` names the rule list that produced the message.
pub trait DiagnosticSink: Send + Sync {
    /// A recoverable gap: the rule was skipped and the pass went on.
    fn warn(&self, message: &str, cause: &dyn Error, source: &str);

    /// An unexpected failure: the pass was aborted.
    fn error(&self, message: &str, cause: &dyn Error, source: &str);

    /// A pass took `elapsed`, more than `threshold`. Reported however the
    /// pass ended; the pass itself is never interrupted.
    fn long_running(&self, source: &str, elapsed: Duration, threshold: Duration) {
        tracing::warn!(
            source,
            elapsed = ?elapsed,
            threshold = ?threshold,
            "long running rule list: {source}"
        );
    }
}

/// Default sink: emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, message: &str, cause: &dyn Error, source: &str) {
        tracing::warn!(source, cause = %cause, "{message}");
    }

    fn error(&self, message: &str, cause: &dyn Error, source: &str) {
        tracing::error!(source, cause = %cause, "{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
    /// The pass exceeded the long-running threshold.
    Slow,
}

/// One message captured by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub cause: String,
    pub source: String,
}

/// Sink that keeps every message in memory. Useful in tests and for hosts
/// that surface diagnostics per request.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn record(&self, severity: Severity, message: String, cause: String, source: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Diagnostic {
                severity,
                message,
                cause,
                source: source.to_owned(),
            });
    }
}

impl DiagnosticSink for MemorySink {
    fn warn(&self, message: &str, cause: &dyn Error, source: &str) {
        self.record(Severity::Warn, message.to_owned(), cause.to_string(), source);
    }

    fn error(&self, message: &str, cause: &dyn Error, source: &str) {
        self.record(Severity::Error, message.to_owned(), cause.to_string(), source);
    }

    fn long_running(&self, source: &str, elapsed: Duration, threshold: Duration) {
        self.record(
            Severity::Slow,
            format!("long running rule list: {source}"),
            format!("took {elapsed:?}, threshold {threshold:?}"),
            source,
        );
    }
}

/// Scoped timer around one pass. Reports to the sink on drop when the pass
/// took longer than the threshold.
pub(crate) struct PassTimer<'a> {
    started: Instant,
    threshold: Duration,
    source: &'a str,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> PassTimer<'a> {
    pub(crate) fn start(threshold: Duration, source: &'a str, sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            started: Instant::now(),
            threshold,
            source,
            sink,
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for PassTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        if elapsed > self.threshold {
            self.sink.long_running(self.source, elapsed, self.threshold);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConditionError;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        let cause = ConditionError::dependency_unavailable("tracker");
        sink.warn("skipped", &cause, "hero");
        sink.error("aborted", &ConditionError::evaluation("boom"), "hero");

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].severity, Severity::Warn);
        assert_eq!(entries[0].cause, "tracker is not available");
        assert_eq!(entries[1].severity, Severity::Error);
        assert_eq!(entries[1].source, "hero");
        assert_eq!(sink.count(Severity::Warn), 1);
        assert_eq!(sink.count(Severity::Error), 1);
    }

    #[test]
    fn tracing_sink_without_subscriber_is_silent() {
        let cause = ConditionError::evaluation("boom");
        TracingSink.warn("w", &cause, "s");
        TracingSink.error("e", &cause, "s");
        TracingSink.long_running("s", Duration::from_millis(2), Duration::from_millis(1));
    }

    #[test]
    fn pass_timer_measures() {
        let sink = MemorySink::new();
        let timer = PassTimer::start(Duration::from_secs(60), "hero", &sink);
        assert!(timer.elapsed() < Duration::from_secs(60));
        drop(timer);
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn slow_pass_reaches_the_sink() {
        let sink = MemorySink::new();
        let timer = PassTimer::start(Duration::ZERO, "hero", &sink);
        std::thread::sleep(Duration::from_millis(1));
        drop(timer);

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Slow);
        assert_eq!(entries[0].source, "hero");
        assert_eq!(entries[0].message, "long running rule list: hero");
        assert_eq!(sink.count(Severity::Warn), 0);
    }
}
