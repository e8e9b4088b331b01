use super::params::AmountThresholdParams;
use super::{RuleOutcome, RuleScorer};
use crate::models::{Transaction, REASON_EXCEEDS_THRESHOLD};
use rust_decimal::Decimal;
use uuid::Uuid;

/// How a firing amount rule affects the transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvaluationMode {
    /// Fails the transaction outright.
    Binary,
    /// Adds the weight to the running score.
    Weighted(f64),
}

#[derive(Debug, Clone)]
pub struct AmountThresholdRule {
    id: Uuid,
    threshold: Decimal,
    mode: EvaluationMode,
}

impl AmountThresholdRule {
    pub fn new(id: Uuid, params: AmountThresholdParams) -> Self {
        let mode = match params.weight {
            Some(weight) => EvaluationMode::Weighted(weight),
            None => EvaluationMode::Binary,
        };

        AmountThresholdRule {
            id,
            threshold: params.threshold,
            mode,
        }
    }

    // Zero and negative amounts never reach any threshold.
    fn fires(&self, amount: Decimal) -> bool {
        amount > Decimal::ZERO && amount >= self.threshold
    }
}

impl RuleScorer for AmountThresholdRule {
    fn rule_id(&self) -> Uuid {
        self.id
    }

    fn score(&self, tx: &Transaction) -> RuleOutcome {
        if !self.fires(tx.amount) {
            return RuleOutcome::NoMatch;
        }

        match self.mode {
            EvaluationMode::Binary => RuleOutcome::Reject(REASON_EXCEEDS_THRESHOLD),
            EvaluationMode::Weighted(weight) => RuleOutcome::Score(weight),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::transaction;
    use rust_decimal_macros::dec;

    fn amount_rule(threshold: Decimal, weight: Option<f64>) -> AmountThresholdRule {
        AmountThresholdRule::new(
            Uuid::new_v4(),
            AmountThresholdParams { threshold, weight },
        )
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let rule = amount_rule(dec!(10000), Some(0.7));
        assert_eq!(rule.score(&transaction(dec!(10000))), RuleOutcome::Score(0.7));
        assert_eq!(rule.score(&transaction(dec!(9999.99))), RuleOutcome::NoMatch);
    }

    #[test]
    fn test_binary_rule_rejects() {
        let rule = amount_rule(dec!(5000), None);
        assert_eq!(
            rule.score(&transaction(dec!(5000.01))),
            RuleOutcome::Reject(REASON_EXCEEDS_THRESHOLD)
        );
    }

    #[test]
    fn test_non_positive_amounts_never_fire() {
        let rule = amount_rule(dec!(0), None);
        assert_eq!(rule.score(&transaction(dec!(0))), RuleOutcome::NoMatch);
        assert_eq!(rule.score(&transaction(dec!(-250))), RuleOutcome::NoMatch);
        assert_eq!(
            rule.score(&transaction(dec!(0.01))),
            RuleOutcome::Reject(REASON_EXCEEDS_THRESHOLD)
        );
    }
}
