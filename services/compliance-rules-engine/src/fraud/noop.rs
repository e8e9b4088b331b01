use super::{FraudPayload, FraudResponse, FraudScorer};
use crate::errors::FraudScorerError;
use async_trait::async_trait;

/// Stands in for the oracle when none is configured. Never touches the network.
pub struct NoopFraudScorer {
    default_score: f64,
}

impl NoopFraudScorer {
    pub fn new(default_score: f64) -> Self {
        NoopFraudScorer { default_score }
    }
}

impl Default for NoopFraudScorer {
    fn default() -> Self {
        Self::new(0.1)
    }
}

#[async_trait]
impl FraudScorer for NoopFraudScorer {
    async fn evaluate(&self, _payload: &FraudPayload) -> Result<FraudResponse, FraudScorerError> {
        FraudResponse::from_value(serde_json::json!({
            "score": self.default_score,
            "recommendation": "approve"
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::transaction;
    use rust_decimal_macros::dec;
    use tokio_test::{assert_ok, block_on};

    #[test]
    fn test_returns_benign_default() {
        let payload = FraudPayload::from(&transaction(dec!(1_000_000)));
        let response = assert_ok!(block_on(NoopFraudScorer::default().evaluate(&payload)));
        assert_eq!(response.score(), Some(0.1));
        assert_eq!(
            response.field("recommendation"),
            Some(&serde_json::json!("approve"))
        );
    }

    #[test]
    fn test_custom_default_score() {
        let payload = FraudPayload::from(&transaction(dec!(5)));
        let response = assert_ok!(block_on(NoopFraudScorer::new(0.0).evaluate(&payload)));
        assert_eq!(response.score(), Some(0.0));
    }
}
