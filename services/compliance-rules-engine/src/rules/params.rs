use crate::errors::RuleDataError;
use crate::models::RuleType;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Typed rule parameters, keyed by rule type.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleParams {
    AmountThreshold(AmountThresholdParams),
    SanctionsList(SanctionsListParams),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmountThresholdParams {
    pub threshold: Decimal,
    /// `None` means the rule is a hard gate rather than a score contribution.
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SanctionsListParams {
    pub identifiers: Vec<String>,
}

// Decimal accepts both JSON numbers and numeric strings.
#[derive(Deserialize)]
struct RawAmountThreshold {
    threshold: Decimal,
    #[serde(default)]
    weight: Option<RawWeight>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawWeight {
    Number(f64),
    Text(String),
}

impl RawWeight {
    fn value(&self) -> Result<f64, RuleDataError> {
        let weight = match self {
            RawWeight::Number(weight) => *weight,
            RawWeight::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| RuleDataError::InvalidWeight)?,
        };

        if !weight.is_finite() || weight < 0.0 {
            return Err(RuleDataError::InvalidWeight);
        }
        Ok(weight)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSanctionsList {
    List(Vec<String>),
    Object {
        #[serde(alias = "accounts")]
        identifiers: Vec<String>,
    },
}

const LIST_DELIMITERS: &[char] = &[',', ';', '\n', '\r', '\t', ' ', '|'];

impl RuleParams {
    pub fn parse(rule_type: &RuleType, raw: &str) -> Result<Self, RuleDataError> {
        match rule_type {
            RuleType::AmountThreshold => {
                AmountThresholdParams::parse(raw).map(RuleParams::AmountThreshold)
            }
            RuleType::SanctionsList => {
                SanctionsListParams::parse(raw).map(RuleParams::SanctionsList)
            }
            RuleType::Other(tag) => Err(RuleDataError::UnsupportedType(tag.clone())),
        }
    }
}

impl AmountThresholdParams {
    pub fn parse(raw: &str) -> Result<Self, RuleDataError> {
        let parsed: RawAmountThreshold = serde_json::from_str(raw)
            .map_err(|e| RuleDataError::InvalidJson(e.to_string()))?;

        if parsed.threshold.is_sign_negative() {
            return Err(RuleDataError::InvalidThreshold);
        }

        let weight = parsed.weight.as_ref().map(RawWeight::value).transpose()?;

        Ok(AmountThresholdParams {
            threshold: parsed.threshold,
            weight,
        })
    }
}

impl SanctionsListParams {
    pub fn parse(raw: &str) -> Result<Self, RuleDataError> {
        let trimmed = raw.trim();

        let entries = if trimmed.starts_with('[') || trimmed.starts_with('{') {
            match serde_json::from_str::<RawSanctionsList>(trimmed)
                .map_err(|e| RuleDataError::InvalidJson(e.to_string()))?
            {
                RawSanctionsList::List(list) => list,
                RawSanctionsList::Object { identifiers } => identifiers,
            }
        } else {
            trimmed.split(LIST_DELIMITERS).map(str::to_string).collect()
        };

        let identifiers: Vec<String> = entries
            .into_iter()
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect();

        if identifiers.is_empty() {
            return Err(RuleDataError::EmptyIdentifierList);
        }

        Ok(SanctionsListParams { identifiers })
    }
}
