//! External fraud-scoring oracle.
//!
//! The oracle is advisory: callers treat every error as a zero contribution.

pub mod http;
pub mod noop;

pub use http::HttpFraudScorer;
pub use noop::NoopFraudScorer;

use crate::config::FraudConfig;
use crate::errors::{ComplianceResult, FraudScorerError};
use crate::models::Transaction;
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FraudPayload {
    pub transaction_id: String,
    pub amount: f64,
    pub currency: String,
    pub from: String,
    pub to: String,
    pub customer_id: String,
}

impl From<&Transaction> for FraudPayload {
    fn from(tx: &Transaction) -> Self {
        FraudPayload {
            transaction_id: tx.transaction_id.clone(),
            amount: tx.amount.to_f64().unwrap_or_default(),
            currency: tx.currency.clone(),
            from: tx.from_account.clone(),
            to: tx.to_account.clone(),
            customer_id: tx.customer_id.clone(),
        }
    }
}

/// Raw oracle response. Only a numeric `score` field is consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct FraudResponse {
    body: serde_json::Map<String, serde_json::Value>,
}

impl FraudResponse {
    pub fn from_value(value: serde_json::Value) -> Result<Self, FraudScorerError> {
        match value {
            serde_json::Value::Object(body) => Ok(FraudResponse { body }),
            other => Err(FraudScorerError::Malformed(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    /// The usable `score`, if present, finite and non-negative.
    pub fn score(&self) -> Option<f64> {
        self.body
            .get("score")
            .and_then(serde_json::Value::as_f64)
            .filter(|score| score.is_finite() && *score >= 0.0)
    }

    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.body.get(name)
    }
}

#[async_trait]
pub trait FraudScorer: Send + Sync {
    async fn evaluate(&self, payload: &FraudPayload) -> Result<FraudResponse, FraudScorerError>;
}

/// HTTP scorer when an endpoint is configured, otherwise the no-op scorer.
pub fn build_fraud_scorer(config: &FraudConfig) -> ComplianceResult<Arc<dyn FraudScorer>> {
    match config.endpoint() {
        Some(url) => {
            info!(url, timeout_seconds = config.timeout_seconds, "Using external fraud scorer");
            let scorer: Arc<dyn FraudScorer> = Arc::new(HttpFraudScorer::new(
                url.to_string(),
                Duration::from_secs(config.timeout_seconds),
            )?);
            Ok(scorer)
        }
        None => {
            info!(default_score = config.default_score, "No fraud scorer configured, using benign default");
            let scorer: Arc<dyn FraudScorer> = Arc::new(NoopFraudScorer::new(config.default_score));
            Ok(scorer)
        }
    }
}
