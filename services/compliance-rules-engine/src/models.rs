use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ===== Transaction =====
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: String,
    pub customer_id: String,
    pub from_account: String,
    pub to_account: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Transaction {
    /// Identifiers screened against sanctions: source, destination, customer.
    pub fn counterparties(&self) -> [&str; 3] {
        [&self.from_account, &self.to_account, &self.customer_id]
    }
}

// ===== Rules =====
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleType {
    AmountThreshold,
    SanctionsList,
    /// Stored with a tag this build does not evaluate.
    Other(String),
}

impl RuleType {
    pub fn as_str(&self) -> &str {
        match self {
            RuleType::AmountThreshold => "amount_threshold",
            RuleType::SanctionsList => "sanctions_list",
            RuleType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "amount_threshold" => RuleType::AmountThreshold,
            "sanctions_list" => RuleType::SanctionsList,
            other => RuleType::Other(other.to_string()),
        })
    }
}

impl From<String> for RuleType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "amount_threshold" => RuleType::AmountThreshold,
            "sanctions_list" => RuleType::SanctionsList,
            _ => RuleType::Other(tag),
        }
    }
}

impl Serialize for RuleType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(RuleType::from)
    }
}

/// A stored rule. `params` is kept as the raw text the store holds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Rule {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub params: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewRule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    /// Accepts either a JSON value or its text form.
    pub params: serde_json::Value,
}

impl NewRule {
    pub fn params_text(&self) -> String {
        match &self.params {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

// ===== Sanctions =====
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SanctionEntry {
    pub id: Uuid,
    pub account_id: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewSanction {
    pub account_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

// ===== Decisions =====
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DecisionTier {
    Approve,
    Review,
    Reject,
}

impl DecisionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionTier::Approve => "approve",
            DecisionTier::Review => "review",
            DecisionTier::Reject => "reject",
        }
    }
}

impl fmt::Display for DecisionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(DecisionTier::Approve),
            "review" => Ok(DecisionTier::Review),
            "reject" => Ok(DecisionTier::Reject),
            other => Err(format!("unknown decision tier '{}'", other)),
        }
    }
}

pub const REASON_APPROVED: &str = "OK";
pub const REASON_REVIEW: &str = "requires manual review";
pub const REASON_HIGH_RISK: &str = "high risk based on rules and external signals";
pub const REASON_EXCEEDS_THRESHOLD: &str = "exceeds threshold";
pub const REASON_SANCTIONED: &str = "account is sanctioned";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Decision {
    pub decision: DecisionTier,
    pub reason: String,
    pub score: f64,
}

/// Per-signal contributions gathered before normalization.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub rules: f64,
    pub sanctions: f64,
    pub external: f64,
}

impl ScoreBreakdown {
    pub fn raw_total(&self) -> f64 {
        self.rules + self.sanctions + self.external
    }
}

// ===== Audit =====
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuditRecord {
    pub transaction_id: String,
    pub customer_id: String,
    pub decision: DecisionTier,
    pub reason: String,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuditLog {
    pub id: Uuid,
    pub transaction_id: String,
    pub customer_id: String,
    pub decision: DecisionTier,
    pub reason: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// ===== API Responses =====
#[derive(Debug, Serialize)]
pub struct RiskScoreResponse {
    pub customer_id: String,
    pub risk_score: f64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_camel_case_binding() {
        let tx: Transaction = serde_json::from_value(serde_json::json!({
            "transactionId": "tx-1",
            "customerId": "cust-1",
            "fromAccount": "ACC-A",
            "toAccount": "ACC-B",
            "amount": 1250.50,
            "currency": "USD"
        }))
        .unwrap();

        assert_eq!(tx.amount, dec!(1250.50));
        assert_eq!(tx.counterparties(), ["ACC-A", "ACC-B", "cust-1"]);
        assert!(tx.metadata.is_none());
    }

    #[test]
    fn test_rule_type_round_trips_unknown_tags() {
        let parsed: RuleType = "velocity".parse().unwrap();
        assert_eq!(parsed, RuleType::Other("velocity".to_string()));
        assert_eq!(parsed.as_str(), "velocity");
        assert_eq!(
            serde_json::to_string(&RuleType::AmountThreshold).unwrap(),
            "\"amount_threshold\""
        );
    }

    #[test]
    fn test_new_rule_params_text() {
        let rule: NewRule = serde_json::from_value(serde_json::json!({
            "name": "large",
            "type": "amount_threshold",
            "params": {"threshold": 10000}
        }))
        .unwrap();
        assert_eq!(rule.params_text(), r#"{"threshold":10000}"#);

        let rule: NewRule = serde_json::from_value(serde_json::json!({
            "name": "blocked",
            "type": "sanctions_list",
            "params": "ACC-1,ACC-2"
        }))
        .unwrap();
        assert_eq!(rule.params_text(), "ACC-1,ACC-2");
        assert_eq!(rule.rule_type, RuleType::SanctionsList);
    }

    #[test]
    fn test_decision_tier_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&DecisionTier::Review).unwrap(), "\"review\"");
        assert_eq!("reject".parse::<DecisionTier>().unwrap(), DecisionTier::Reject);
        assert!("maybe".parse::<DecisionTier>().is_err());
    }
}
