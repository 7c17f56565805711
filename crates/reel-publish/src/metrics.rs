//! Publish metrics.
//!
//! Provides standardized metrics for monitoring publishing:
//! - Attempt counters by target and outcome
//! - Terminal result counters by target
//! - Accumulated readiness wait per target

use metrics::{counter, histogram};
use std::time::Duration;

/// Metric name constants for consistency.
pub mod names {
    /// Publish attempts by target and outcome.
    pub const ATTEMPTS_TOTAL: &str = "reel_publish_attempts_total";

    /// Terminal publish results by target and result.
    pub const RESULTS_TOTAL: &str = "reel_publish_results_total";

    /// Accumulated wait before a terminal result, in seconds.
    pub const WAIT_SECONDS: &str = "reel_publish_wait_seconds";
}

/// Outcome label values for attempts.
pub mod outcome {
    pub const CONFIRMED: &str = "confirmed";
    pub const NOT_READY: &str = "not_ready";
    pub const REJECTED: &str = "rejected";
    pub const TIMEOUT: &str = "timeout";
}

/// Record one publish attempt.
pub fn record_attempt(target: &str, outcome: &'static str) {
    counter!(
        names::ATTEMPTS_TOTAL,
        "target" => target.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record the terminal result of a coordinated publish.
pub fn record_result(target: &str, result: &'static str, waited: Duration) {
    counter!(
        names::RESULTS_TOTAL,
        "target" => target.to_string(),
        "result" => result
    )
    .increment(1);

    histogram!(
        names::WAIT_SECONDS,
        "target" => target.to_string()
    )
    .record(waited.as_secs_f64());
}
