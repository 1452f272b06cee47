//! Telemetry for the memory save path
//!
//! Tracks turn saves and summarization outcomes. Metrics are labeled by
//! memory mode so buffer-only and summary-mode traffic can be separated.
//!
//! # Metrics
//!
//! - `memory_turns_saved_total`: Counter of saved turns by mode
//! - `memory_save_duration_seconds`: Histogram of save duration by mode
//! - `memory_save_errors_total`: Counter of failed saves by error type
//! - `memory_saves_in_flight`: Gauge of saves currently executing
//! - `memory_summary_updates_total`: Counter of summary step outcomes
//! - `memory_summary_duration_seconds`: Histogram of summary step duration
//! - `memory_sessions_cleared_total`: Counter of session deletions

use std::cell::Cell;
use std::time::{Duration, Instant};

use metrics::{decrement_gauge, histogram, increment_counter, increment_gauge};

/// Metrics for one `save_context` call
///
/// Uses interior mutability (Cell) so outcomes can be recorded through
/// immutable references. Dropping without recording still decrements the
/// in-flight gauge, keeping it accurate when a save panics.
#[derive(Debug)]
pub struct SaveMetrics {
    start: Instant,
    recorded: Cell<bool>,
}

impl SaveMetrics {
    /// Start tracking a save and bump the in-flight gauge
    pub fn new() -> Self {
        increment_gauge!("memory_saves_in_flight", 1.0);
        Self {
            start: Instant::now(),
            recorded: Cell::new(false),
        }
    }

    /// Record a completed save under the given mode label
    pub fn record_saved(&self, mode: &str) {
        if self.recorded.get() {
            return;
        }
        self.recorded.set(true);

        histogram!(
            "memory_save_duration_seconds",
            self.start.elapsed().as_secs_f64(),
            "mode" => mode.to_string()
        );
        increment_counter!("memory_turns_saved_total", "mode" => mode.to_string());
        decrement_gauge!("memory_saves_in_flight", 1.0);
    }

    /// Record a failed save
    pub fn record_error(&self, error_type: &str) {
        if self.recorded.get() {
            return;
        }
        self.recorded.set(true);

        increment_counter!("memory_save_errors_total", "error_type" => error_type.to_string());
        decrement_gauge!("memory_saves_in_flight", 1.0);
    }

    /// Elapsed time since the save started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for SaveMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SaveMetrics {
    fn drop(&mut self) {
        if !self.recorded.get() {
            decrement_gauge!("memory_saves_in_flight", 1.0);
        }
    }
}

/// Record the outcome of one summary fold ("updated", "error" or "timeout")
pub fn record_summary_outcome(status: &str, duration: Duration) {
    histogram!(
        "memory_summary_duration_seconds",
        duration.as_secs_f64(),
        "status" => status.to_string()
    );
    increment_counter!("memory_summary_updates_total", "status" => status.to_string());
}

/// Count a session deletion
pub fn record_session_cleared() {
    increment_counter!("memory_sessions_cleared_total");
}

/// Initializes the metrics exporter for Prometheus
///
/// Only has an effect when compiled with the `prometheus` feature; without
/// it the function is a safe no-op.
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}
