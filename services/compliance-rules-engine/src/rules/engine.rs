use super::{CompiledRule, RuleOutcome, RuleScorer};
use crate::errors::ComplianceResult;
use crate::metrics::RULES_SKIPPED_TOTAL;
use crate::models::{Rule, RuleType, Transaction};
use crate::store::RuleStore;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct RuleRejection {
    pub rule_id: Uuid,
    pub reason: &'static str,
}

/// Result of running every stored rule of one type against a transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleEvaluation {
    pub score: f64,
    pub fired: Vec<Uuid>,
    pub skipped: Vec<Uuid>,
    /// Set when a binary rule failed the transaction; evaluation stops there.
    pub rejection: Option<RuleRejection>,
}

#[derive(Clone)]
pub struct RuleEngine {
    store: Arc<dyn RuleStore>,
    sanctions_increment: f64,
}

impl RuleEngine {
    pub fn new(store: Arc<dyn RuleStore>, sanctions_increment: f64) -> Self {
        RuleEngine {
            store,
            sanctions_increment,
        }
    }

    /// Load rules of `rule_type` and score `tx` against them.
    ///
    /// Store failures propagate. Rules whose payload does not parse are
    /// skipped and never affect the score.
    pub async fn evaluate(
        &self,
        rule_type: &RuleType,
        tx: &Transaction,
    ) -> ComplianceResult<RuleEvaluation> {
        let rules = self.store.find_rules_by_type(rule_type).await?;
        Ok(self.evaluate_rules(&rules, tx))
    }

    pub fn evaluate_rules(&self, rules: &[Rule], tx: &Transaction) -> RuleEvaluation {
        let mut evaluation = RuleEvaluation::default();

        for rule in rules {
            let compiled = match CompiledRule::compile(rule, self.sanctions_increment) {
                Ok(compiled) => compiled,
                Err(e) => {
                    warn!(
                        rule_id = %rule.id,
                        rule = %rule.name,
                        rule_type = %rule.rule_type,
                        error = %e,
                        "Skipping rule with malformed parameters"
                    );
                    RULES_SKIPPED_TOTAL
                        .with_label_values(&[rule.rule_type.as_str()])
                        .inc();
                    evaluation.skipped.push(rule.id);
                    continue;
                }
            };

            match compiled.score(tx) {
                RuleOutcome::NoMatch => {}
                RuleOutcome::Score(weight) => {
                    debug!(rule_id = %rule.id, rule = %rule.name, tx = %tx.transaction_id, weight, "Rule fired");
                    evaluation.score += weight;
                    evaluation.fired.push(rule.id);
                }
                RuleOutcome::Reject(reason) => {
                    debug!(rule_id = %rule.id, rule = %rule.name, tx = %tx.transaction_id, reason, "Rule rejected transaction");
                    evaluation.fired.push(rule.id);
                    evaluation.rejection = Some(RuleRejection {
                        rule_id: rule.id,
                        reason,
                    });
                    break;
                }
            }
        }

        evaluation
    }
}
