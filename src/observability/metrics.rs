use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics registry for the application.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Total evaluation requests completed
    pub evaluations_total: AtomicU64,

    /// Evaluations by outcome
    pub evaluations_with_winner: AtomicU64,
    pub evaluations_unmatched: AtomicU64,

    /// Requests rejected before evaluation
    pub validation_failures: AtomicU64,

    /// Evaluation latency buckets (microseconds)
    pub latency_under_1ms: AtomicU64,
    pub latency_1_5ms: AtomicU64,
    pub latency_5_10ms: AtomicU64,
    pub latency_10_50ms: AtomicU64,
    pub latency_50_100ms: AtomicU64,
    pub latency_over_100ms: AtomicU64,

    /// Rule evaluation counts
    pub rules_evaluated_total: AtomicU64,
    pub rules_matched_total: AtomicU64,

    /// Audit store appends
    pub audit_writes_total: AtomicU64,
    pub audit_write_errors: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        MetricsRegistry::default()
    }

    /// Record a completed evaluation.
    pub fn record_evaluation(&self, has_winner: bool) {
        self.evaluations_total.fetch_add(1, Ordering::Relaxed);
        if has_winner {
            self.evaluations_with_winner.fetch_add(1, Ordering::Relaxed);
        } else {
            self.evaluations_unmatched.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a request rejected on validation.
    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record evaluation latency.
    pub fn record_latency(&self, start: Instant) {
        let micros = start.elapsed().as_micros() as u64;

        if micros < 1000 {
            self.latency_under_1ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 5000 {
            self.latency_1_5ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 10000 {
            self.latency_5_10ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 50000 {
            self.latency_10_50ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 100000 {
            self.latency_50_100ms.fetch_add(1, Ordering::Relaxed);
        } else {
            self.latency_over_100ms.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record how many rules were evaluated and how many matched.
    pub fn record_rules(&self, evaluated: u64, matched: u64) {
        self.rules_evaluated_total
            .fetch_add(evaluated, Ordering::Relaxed);
        self.rules_matched_total.fetch_add(matched, Ordering::Relaxed);
    }

    /// Record an audit store append.
    pub fn record_audit_write(&self, success: bool) {
        self.audit_writes_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.audit_write_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        format!(
            r#"# HELP policr_evaluations_total Total number of evaluation requests
# TYPE policr_evaluations_total counter
policr_evaluations_total {}

# HELP policr_evaluations Evaluation requests by outcome
# TYPE policr_evaluations counter
policr_evaluations{{outcome="winner"}} {}
policr_evaluations{{outcome="unmatched"}} {}

# HELP policr_validation_failures_total Requests rejected on validation
# TYPE policr_validation_failures_total counter
policr_validation_failures_total {}

# HELP policr_evaluation_latency_bucket Evaluation latency histogram
# TYPE policr_evaluation_latency_bucket counter
policr_evaluation_latency_bucket{{le="0.001"}} {}
policr_evaluation_latency_bucket{{le="0.005"}} {}
policr_evaluation_latency_bucket{{le="0.01"}} {}
policr_evaluation_latency_bucket{{le="0.05"}} {}
policr_evaluation_latency_bucket{{le="0.1"}} {}
policr_evaluation_latency_bucket{{le="+Inf"}} {}

# HELP policr_rules_evaluated_total Total rule evaluations
# TYPE policr_rules_evaluated_total counter
policr_rules_evaluated_total {}

# HELP policr_rules_matched_total Total rules that matched
# TYPE policr_rules_matched_total counter
policr_rules_matched_total {}

# HELP policr_audit_writes_total Total audit store appends
# TYPE policr_audit_writes_total counter
policr_audit_writes_total {}

# HELP policr_audit_write_errors_total Failed audit store appends
# TYPE policr_audit_write_errors_total counter
policr_audit_write_errors_total {}
"#,
            self.evaluations_total.load(Ordering::Relaxed),
            self.evaluations_with_winner.load(Ordering::Relaxed),
            self.evaluations_unmatched.load(Ordering::Relaxed),
            self.validation_failures.load(Ordering::Relaxed),
            self.latency_under_1ms.load(Ordering::Relaxed),
            self.latency_1_5ms.load(Ordering::Relaxed),
            self.latency_5_10ms.load(Ordering::Relaxed),
            self.latency_10_50ms.load(Ordering::Relaxed),
            self.latency_50_100ms.load(Ordering::Relaxed),
            self.latency_over_100ms.load(Ordering::Relaxed),
            self.rules_evaluated_total.load(Ordering::Relaxed),
            self.rules_matched_total.load(Ordering::Relaxed),
            self.audit_writes_total.load(Ordering::Relaxed),
            self.audit_write_errors.load(Ordering::Relaxed),
        )
    }
}
