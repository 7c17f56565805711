//! Run metrics.

use metrics::counter;

/// Metric name constants for consistency.
pub mod names {
    /// Clips by preparation outcome (prepared / skipped).
    pub const CLIPS_TOTAL: &str = "reel_clips_total";

    /// Runs by result (completed / aborted).
    pub const RUNS_TOTAL: &str = "reel_runs_total";

    /// Cleanup operations by kind and result.
    pub const CLEANUP_TOTAL: &str = "reel_cleanup_total";
}

pub fn record_clip(outcome: &'static str) {
    counter!(names::CLIPS_TOTAL, "outcome" => outcome).increment(1);
}

pub fn record_run(result: &'static str, error_kind: &'static str) {
    counter!(names::RUNS_TOTAL, "result" => result, "error" => error_kind).increment(1);
}

pub fn record_cleanup(kind: &'static str, ok: bool) {
    counter!(
        names::CLEANUP_TOTAL,
        "kind" => kind,
        "result" => if ok { "ok" } else { "error" }
    )
    .increment(1);
}
