use crate::config::SanctionsMode;
use crate::errors::ComplianceResult;
use crate::models::{RuleType, Transaction};
use crate::rules::RuleEngine;
use crate::store::RuleStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Which counterparty produced a sanctions hit.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Counterparty {
    Source,
    Destination,
    Customer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SanctionsOutcome {
    Clear,
    /// Exact mode: a counterparty is on the sanctions table.
    Blocked { counterparty: Counterparty },
    /// Substring mode: additive contribution from matching `sanctions_list` rules.
    Scored { score: f64, matched_rules: Vec<Uuid> },
}

impl SanctionsOutcome {
    pub fn score(&self) -> f64 {
        match self {
            SanctionsOutcome::Scored { score, .. } => *score,
            _ => 0.0,
        }
    }
}

pub struct SanctionsMatcher {
    mode: SanctionsMode,
    store: Arc<dyn RuleStore>,
    rule_engine: RuleEngine,
}

impl SanctionsMatcher {
    pub fn new(mode: SanctionsMode, store: Arc<dyn RuleStore>, rule_engine: RuleEngine) -> Self {
        SanctionsMatcher {
            mode,
            store,
            rule_engine,
        }
    }

    pub fn mode(&self) -> SanctionsMode {
        self.mode
    }

    pub async fn check(&self, tx: &Transaction) -> ComplianceResult<SanctionsOutcome> {
        match self.mode {
            SanctionsMode::Exact => self.check_exact(tx).await,
            SanctionsMode::Substring => self.check_substring(tx).await,
        }
    }

    async fn check_exact(&self, tx: &Transaction) -> ComplianceResult<SanctionsOutcome> {
        let candidates = [
            (Counterparty::Source, tx.from_account.as_str()),
            (Counterparty::Destination, tx.to_account.as_str()),
            (Counterparty::Customer, tx.customer_id.as_str()),
        ];

        for (counterparty, identifier) in candidates {
            // Entries are stored trimmed.
            let identifier = identifier.trim();
            if identifier.is_empty() {
                continue;
            }
            if self.store.is_account_sanctioned(identifier).await? {
                warn!(
                    tx = %tx.transaction_id,
                    customer = %tx.customer_id,
                    counterparty = ?counterparty,
                    "Sanctioned counterparty"
                );
                return Ok(SanctionsOutcome::Blocked { counterparty });
            }
        }

        Ok(SanctionsOutcome::Clear)
    }

    async fn check_substring(&self, tx: &Transaction) -> ComplianceResult<SanctionsOutcome> {
        let evaluation = self.rule_engine.evaluate(&RuleType::SanctionsList, tx).await?;

        if evaluation.fired.is_empty() {
            return Ok(SanctionsOutcome::Clear);
        }

        warn!(
            tx = %tx.transaction_id,
            customer = %tx.customer_id,
            matched = evaluation.fired.len(),
            "Counterparty matched sanctions list rules"
        );
        Ok(SanctionsOutcome::Scored {
            score: evaluation.score,
            matched_rules: evaluation.fired,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewSanction;
    use crate::rules::test_support::transaction;
    use crate::store::InMemoryStore;
    use rust_decimal_macros::dec;

    fn matcher(mode: SanctionsMode, store: Arc<InMemoryStore>) -> SanctionsMatcher {
        let engine = RuleEngine::new(store.clone(), 1.0);
        SanctionsMatcher::new(mode, store, engine)
    }

    async fn sanction(store: &InMemoryStore, account: &str) {
        store
            .add_sanction(&NewSanction {
                account_id: account.to_string(),
                reason: Some("test".to_string()),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_exact_match_blocks_destination() {
        let store = Arc::new(InMemoryStore::new());
        sanction(&store, "ACC-TO").await;

        let outcome = matcher(SanctionsMode::Exact, store)
            .check(&transaction(dec!(10)))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SanctionsOutcome::Blocked {
                counterparty: Counterparty::Destination
            }
        );
    }

    #[tokio::test]
    async fn test_exact_match_checks_customer() {
        let store = Arc::new(InMemoryStore::new());
        sanction(&store, "CUST-1").await;

        let outcome = matcher(SanctionsMode::Exact, store)
            .check(&transaction(dec!(10)))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SanctionsOutcome::Blocked {
                counterparty: Counterparty::Customer
            }
        );
    }

    #[tokio::test]
    async fn test_exact_mode_ignores_list_rules() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_raw_rule("watchlist", RuleType::SanctionsList, "ACC-FROM");

        let outcome = matcher(SanctionsMode::Exact, store)
            .check(&transaction(dec!(10)))
            .await
            .unwrap();
        assert_eq!(outcome, SanctionsOutcome::Clear);
    }

    #[tokio::test]
    async fn test_substring_mode_adds_per_matching_rule() {
        let store = Arc::new(InMemoryStore::new());
        let first = store.insert_raw_rule("ofac", RuleType::SanctionsList, "ACC-FROM,ACC-X");
        let second = store.insert_raw_rule("internal", RuleType::SanctionsList, r#"["CUST-1"]"#);
        store.insert_raw_rule("other", RuleType::SanctionsList, "ACC-Y");
        store.insert_raw_rule("broken", RuleType::SanctionsList, "{not json");
        // Exact table is not consulted in substring mode.
        sanction(&store, "ACC-TO").await;

        let outcome = matcher(SanctionsMode::Substring, store)
            .check(&transaction(dec!(10)))
            .await
            .unwrap();

        match outcome {
            SanctionsOutcome::Scored { score, mut matched_rules } => {
                assert!((score - 2.0).abs() < 1e-9);
                matched_rules.sort();
                let mut expected = vec![first.id, second.id];
                expected.sort();
                assert_eq!(matched_rules, expected);
            }
            other => panic!("expected scored outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_substring_mode_clear() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_raw_rule("ofac", RuleType::SanctionsList, "ACC-Z");

        let outcome = matcher(SanctionsMode::Substring, store)
            .check(&transaction(dec!(10)))
            .await
            .unwrap();
        assert_eq!(outcome, SanctionsOutcome::Clear);
        assert_eq!(outcome.score(), 0.0);
    }
}
