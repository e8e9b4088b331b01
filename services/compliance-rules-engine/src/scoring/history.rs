use crate::config::HistoryConfig;
use crate::models::{AuditLog, DecisionTier};

/// Bounded per-customer risk indicator built from past decisions.
#[derive(Debug, Clone)]
pub struct HistoricalRiskAggregator {
    config: HistoryConfig,
}

impl HistoricalRiskAggregator {
    pub fn new(config: HistoryConfig) -> Self {
        HistoricalRiskAggregator { config }
    }

    /// Number of most recent audit records considered.
    pub fn window(&self) -> i64 {
        self.config.window
    }

    /// Returns a value in `[0, 1]`.
    pub fn score(&self, audits: &[AuditLog]) -> f64 {
        let total: f64 = audits
            .iter()
            .map(|audit| match audit.decision {
                DecisionTier::Reject => self.config.reject_weight,
                DecisionTier::Review => self.config.review_weight,
                DecisionTier::Approve => 0.0,
            })
            .sum();

        total.min(self.config.cap) / self.config.cap
    }
}

impl Default for HistoricalRiskAggregator {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn audits(decisions: &[DecisionTier]) -> Vec<AuditLog> {
        decisions
            .iter()
            .map(|decision| AuditLog {
                id: Uuid::new_v4(),
                transaction_id: Uuid::new_v4().to_string(),
                customer_id: "CUST-1".to_string(),
                decision: *decision,
                reason: String::new(),
                metadata: serde_json::Value::Null,
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_no_history_is_zero() {
        assert_eq!(HistoricalRiskAggregator::default().score(&[]), 0.0);
    }

    #[test]
    fn test_ten_rejects_cap_at_one() {
        let history = audits(&[DecisionTier::Reject; 10]);
        assert_eq!(HistoricalRiskAggregator::default().score(&history), 1.0);
    }

    #[test]
    fn test_mixed_history() {
        let history = audits(&[
            DecisionTier::Reject,
            DecisionTier::Review,
            DecisionTier::Approve,
            DecisionTier::Review,
        ]);
        // (1.0 + 0.5 + 0.5) / 5.0
        assert!((HistoricalRiskAggregator::default().score(&history) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_approvals_carry_no_risk() {
        let history = audits(&[DecisionTier::Approve; 50]);
        assert_eq!(HistoricalRiskAggregator::default().score(&history), 0.0);
    }
}
