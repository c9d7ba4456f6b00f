use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization runs.
#[derive(Default)]
pub struct RunMetrics {
    runs_succeeded: AtomicU64,
    runs_failed: AtomicU64,
    empty_inputs: AtomicU64,
    degraded_replies: AtomicU64,
    truncated_inputs: AtomicU64,
}

impl RunMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed run.
    pub fn record_success(&self, degraded: bool, truncated: bool) {
        self.runs_succeeded.fetch_add(1, Ordering::Relaxed);
        if degraded {
            self.degraded_replies.fetch_add(1, Ordering::Relaxed);
        }
        if truncated {
            self.truncated_inputs.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a failed run; `empty` marks the no-readable-content short-circuit.
    pub fn record_failure(&self, empty: bool) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
        if empty {
            self.empty_inputs.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_succeeded: self.runs_succeeded.load(Ordering::Relaxed),
            runs_failed: self.runs_failed.load(Ordering::Relaxed),
            empty_inputs: self.empty_inputs.load(Ordering::Relaxed),
            degraded_replies: self.degraded_replies.load(Ordering::Relaxed),
            truncated_inputs: self.truncated_inputs.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of run counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Runs that produced a summary.
    pub runs_succeeded: u64,
    /// Runs that ended with an error message.
    pub runs_failed: u64,
    /// Failed runs whose extracted text was empty.
    pub empty_inputs: u64,
    /// Successful runs whose model reply was not structured JSON.
    pub degraded_replies: u64,
    /// Successful runs whose text was cut to the prompt bound.
    pub truncated_inputs: u64,
}
