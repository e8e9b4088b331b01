use super::{FraudPayload, FraudResponse, FraudScorer};
use crate::errors::{ComplianceError, ComplianceResult, FraudScorerError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// POSTs the payload as JSON to the configured endpoint.
pub struct HttpFraudScorer {
    url: String,
    client: Client,
}

impl HttpFraudScorer {
    pub fn new(url: String, timeout: Duration) -> ComplianceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ComplianceError::Configuration(format!("Failed to build fraud scorer client: {}", e))
            })?;

        Ok(HttpFraudScorer { url, client })
    }
}

fn classify(err: reqwest::Error) -> FraudScorerError {
    if err.is_timeout() {
        FraudScorerError::Timeout
    } else if err.is_decode() {
        FraudScorerError::Malformed(err.to_string())
    } else {
        FraudScorerError::Transport(err.to_string())
    }
}

#[async_trait]
impl FraudScorer for HttpFraudScorer {
    async fn evaluate(&self, payload: &FraudPayload) -> Result<FraudResponse, FraudScorerError> {
        debug!(tx = %payload.transaction_id, url = %self.url, "Calling fraud scorer");

        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FraudScorerError::Status(status.as_u16()));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(classify)?;

        FraudResponse::from_value(body)
    }
}
