use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref DECISIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("compliance_decisions_total", "Validated transactions by decision tier"),
        &["decision"]
    ).expect("metric can be created");

    pub static ref SHORT_CIRCUIT_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("compliance_short_circuit_total", "Validations rejected before aggregation"),
        &["cause"]
    ).expect("metric can be created");

    pub static ref RULES_SKIPPED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("compliance_rules_skipped_total", "Rules skipped because of malformed parameters"),
        &["rule_type"]
    ).expect("metric can be created");

    pub static ref FRAUD_SCORER_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("compliance_fraud_scorer_failures_total", "External scorer calls that contributed nothing"),
        &["cause"]
    ).expect("metric can be created");

    pub static ref AUDIT_WRITE_FAILURES_TOTAL: IntCounter = IntCounter::new(
        "compliance_audit_write_failures_total",
        "Audit records that could not be persisted"
    ).expect("metric can be created");

    pub static ref VALIDATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new("compliance_validation_duration_seconds", "End-to-end validation latency")
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0])
    ).expect("metric can be created");
}

/// Register all metrics with the given registry
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(DECISIONS_TOTAL.clone()))?;
    registry.register(Box::new(SHORT_CIRCUIT_TOTAL.clone()))?;
    registry.register(Box::new(RULES_SKIPPED_TOTAL.clone()))?;
    registry.register(Box::new(FRAUD_SCORER_FAILURES_TOTAL.clone()))?;
    registry.register(Box::new(AUDIT_WRITE_FAILURES_TOTAL.clone()))?;
    registry.register(Box::new(VALIDATION_DURATION.clone()))?;
    Ok(())
}

/// Render a registry in Prometheus text format
pub fn render(registry: &Registry) -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        let registry = Registry::new();
        assert!(register_metrics(&registry).is_ok());
        // Same collectors twice is a registration error.
        assert!(register_metrics(&registry).is_err());
    }

    #[test]
    fn test_render_contains_counters() {
        let registry = Registry::new();
        register_metrics(&registry).unwrap();
        DECISIONS_TOTAL.with_label_values(&["approve"]).inc();
        AUDIT_WRITE_FAILURES_TOTAL.inc();

        let output = render(&registry).unwrap();
        assert!(output.contains("compliance_decisions_total"));
        assert!(output.contains("compliance_audit_write_failures_total"));
    }
}
