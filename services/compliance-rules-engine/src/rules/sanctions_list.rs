use super::params::SanctionsListParams;
use super::{RuleOutcome, RuleScorer};
use crate::models::Transaction;
use uuid::Uuid;

/// A `sanctions_list` rule evaluated by containment: a counterparty matches
/// when any flagged entry contains its identifier.
#[derive(Debug, Clone)]
pub struct SanctionsListRule {
    id: Uuid,
    identifiers: Vec<String>,
    increment: f64,
}

impl SanctionsListRule {
    pub fn new(id: Uuid, params: SanctionsListParams, increment: f64) -> Self {
        SanctionsListRule {
            id,
            identifiers: params.identifiers,
            increment,
        }
    }

    pub fn matches(&self, identifier: &str) -> bool {
        let identifier = identifier.trim();
        // An empty needle is contained in everything.
        if identifier.is_empty() {
            return false;
        }
        self.identifiers
            .iter()
            .any(|flagged| flagged.contains(identifier))
    }
}

impl RuleScorer for SanctionsListRule {
    fn rule_id(&self) -> Uuid {
        self.id
    }

    fn score(&self, tx: &Transaction) -> RuleOutcome {
        if tx.counterparties().iter().any(|id| self.matches(id)) {
            RuleOutcome::Score(self.increment)
        } else {
            RuleOutcome::NoMatch
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::transaction;
    use rust_decimal_macros::dec;

    fn list_rule(entries: &[&str]) -> SanctionsListRule {
        SanctionsListRule::new(
            Uuid::new_v4(),
            SanctionsListParams {
                identifiers: entries.iter().map(|e| e.to_string()).collect(),
            },
            1.0,
        )
    }

    #[test]
    fn test_matches_any_counterparty() {
        let tx = transaction(dec!(10));
        assert_eq!(list_rule(&["ACC-FROM"]).score(&tx), RuleOutcome::Score(1.0));
        assert_eq!(list_rule(&["ACC-TO"]).score(&tx), RuleOutcome::Score(1.0));
        assert_eq!(list_rule(&["CUST-1"]).score(&tx), RuleOutcome::Score(1.0));
        assert_eq!(list_rule(&["ACC-OTHER"]).score(&tx), RuleOutcome::NoMatch);
    }

    #[test]
    fn test_containment_not_equality() {
        let rule = list_rule(&["ACC-FROM-LEGACY"]);
        assert!(rule.matches("ACC-FROM"));
        assert!(!rule.matches("ACC-FROM-LEGACY-2"));
    }

    #[test]
    fn test_blank_identifier_never_matches() {
        let rule = list_rule(&["ACC-1"]);
        assert!(!rule.matches(""));
        assert!(!rule.matches("   "));
    }
}
