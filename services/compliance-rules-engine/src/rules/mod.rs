pub mod amount;
pub mod engine;
pub mod params;
pub mod sanctions_list;

pub use amount::AmountThresholdRule;
pub use engine::{RuleEngine, RuleEvaluation, RuleRejection};
pub use params::{AmountThresholdParams, RuleParams, SanctionsListParams};
pub use sanctions_list::SanctionsListRule;

use crate::errors::RuleDataError;
use crate::models::{Rule, Transaction};
use uuid::Uuid;

/// What a single rule says about a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    NoMatch,
    /// Adds to the running score.
    Score(f64),
    /// Fails the transaction outright.
    Reject(&'static str),
}

pub trait RuleScorer {
    fn rule_id(&self) -> Uuid;
    fn score(&self, tx: &Transaction) -> RuleOutcome;
}

/// A stored rule whose payload parsed into an evaluator.
#[derive(Debug, Clone)]
pub enum CompiledRule {
    AmountThreshold(AmountThresholdRule),
    SanctionsList(SanctionsListRule),
}

impl CompiledRule {
    /// `sanctions_increment` is the score a matching `sanctions_list` rule adds.
    pub fn compile(rule: &Rule, sanctions_increment: f64) -> Result<Self, RuleDataError> {
        match RuleParams::parse(&rule.rule_type, &rule.params)? {
            RuleParams::AmountThreshold(params) => Ok(CompiledRule::AmountThreshold(
                AmountThresholdRule::new(rule.id, params),
            )),
            RuleParams::SanctionsList(params) => Ok(CompiledRule::SanctionsList(
                SanctionsListRule::new(rule.id, params, sanctions_increment),
            )),
        }
    }
}

impl RuleScorer for CompiledRule {
    fn rule_id(&self) -> Uuid {
        match self {
            CompiledRule::AmountThreshold(rule) => rule.rule_id(),
            CompiledRule::SanctionsList(rule) => rule.rule_id(),
        }
    }

    fn score(&self, tx: &Transaction) -> RuleOutcome {
        match self {
            CompiledRule::AmountThreshold(rule) => rule.score(tx),
            CompiledRule::SanctionsList(rule) => rule.score(tx),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{Rule, RuleType, Transaction};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    pub fn rule(rule_type: RuleType, params: &str) -> Rule {
        let now = Utc::now();
        Rule {
            id: Uuid::new_v4(),
            name: format!("{} rule", rule_type),
            description: String::new(),
            rule_type,
            params: params.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transaction(amount: Decimal) -> Transaction {
        Transaction {
            transaction_id: "tx-1".to_string(),
            customer_id: "CUST-1".to_string(),
            from_account: "ACC-FROM".to_string(),
            to_account: "ACC-TO".to_string(),
            amount,
            currency: "USD".to_string(),
            metadata: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{rule, transaction};
    use super::*;
    use crate::models::RuleType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compile_dispatches_by_type() {
        let amount = rule(RuleType::AmountThreshold, r#"{"threshold": 100, "weight": 0.4}"#);
        let compiled = CompiledRule::compile(&amount, 1.0).unwrap();
        assert!(matches!(compiled, CompiledRule::AmountThreshold(_)));
        assert_eq!(compiled.rule_id(), amount.id);
        assert_eq!(compiled.score(&transaction(dec!(150))), RuleOutcome::Score(0.4));

        let sanctions = rule(RuleType::SanctionsList, "ACC-TO");
        let compiled = CompiledRule::compile(&sanctions, 1.0).unwrap();
        assert!(matches!(compiled, CompiledRule::SanctionsList(_)));
        assert_eq!(compiled.score(&transaction(dec!(1))), RuleOutcome::Score(1.0));
    }

    #[test]
    fn test_compile_rejects_malformed_payload() {
        let broken = rule(RuleType::AmountThreshold, r#"{"threshold": "ten"}"#);
        assert!(CompiledRule::compile(&broken, 1.0).is_err());
    }
}
