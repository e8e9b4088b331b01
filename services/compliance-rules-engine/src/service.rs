use crate::config::{Config, HistoryConfig, SanctionsConfig, SanctionsMode, ScoringConfig};
use crate::errors::{ComplianceError, ComplianceResult, FraudScorerError};
use crate::fraud::{FraudPayload, FraudScorer};
use crate::metrics::{
    AUDIT_WRITE_FAILURES_TOTAL, DECISIONS_TOTAL, FRAUD_SCORER_FAILURES_TOTAL, SHORT_CIRCUIT_TOTAL,
    VALIDATION_DURATION,
};
use crate::models::{
    AuditRecord, Decision, NewRule, NewSanction, Rule, RuleType, SanctionEntry, ScoreBreakdown,
    Transaction, REASON_SANCTIONED,
};
use crate::rules::{RuleEngine, RuleEvaluation, RuleParams};
use crate::sanctions::{SanctionsMatcher, SanctionsOutcome};
use crate::scoring::{HistoricalRiskAggregator, ScoreAggregator};
use crate::store::{AuditStore, RuleStore};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const DEFAULT_RULE_LIST_LIMIT: i64 = 50;
pub const MAX_RULE_LIST_LIMIT: i64 = 500;

/// Tunables for one validation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sanctions: SanctionsConfig,
    pub scoring: ScoringConfig,
    pub history: HistoryConfig,
    /// Upper bound on a single external scorer call.
    pub fraud_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            sanctions: SanctionsConfig {
                mode: SanctionsMode::Exact,
                substring_increment: 1.0,
            },
            scoring: ScoringConfig::default(),
            history: HistoryConfig::default(),
            fraud_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        PipelineConfig {
            sanctions: config.sanctions.clone(),
            scoring: config.scoring.clone(),
            history: config.history.clone(),
            fraud_timeout: Duration::from_secs(config.fraud.timeout_seconds),
        }
    }
}

/// Why a transaction was rejected before score aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShortCircuit {
    AmountThreshold,
    Sanctions,
}

impl ShortCircuit {
    fn as_str(&self) -> &'static str {
        match self {
            ShortCircuit::AmountThreshold => "amount_threshold",
            ShortCircuit::Sanctions => "sanctions",
        }
    }
}

/// Orchestrates rules, sanctions, the external scorer, aggregation and audit.
pub struct ComplianceService {
    rule_store: Arc<dyn RuleStore>,
    audit_store: Arc<dyn AuditStore>,
    fraud_scorer: Arc<dyn FraudScorer>,
    rule_engine: RuleEngine,
    sanctions: SanctionsMatcher,
    aggregator: ScoreAggregator,
    history: HistoricalRiskAggregator,
    fraud_timeout: Duration,
    started_at: Instant,
}

impl ComplianceService {
    pub fn new(
        rule_store: Arc<dyn RuleStore>,
        audit_store: Arc<dyn AuditStore>,
        fraud_scorer: Arc<dyn FraudScorer>,
        config: PipelineConfig,
    ) -> Self {
        let rule_engine = RuleEngine::new(rule_store.clone(), config.sanctions.substring_increment);
        let sanctions =
            SanctionsMatcher::new(config.sanctions.mode, rule_store.clone(), rule_engine.clone());

        ComplianceService {
            rule_store,
            audit_store,
            fraud_scorer,
            rule_engine,
            sanctions,
            aggregator: ScoreAggregator::new(config.scoring),
            history: HistoricalRiskAggregator::new(config.history),
            fraud_timeout: config.fraud_timeout,
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    // ===== Validation pipeline =====

    /// Decide on a transaction and append an audit record.
    ///
    /// Store failures while loading rules or sanctions fail the request.
    /// External scorer failures and audit write failures never do.
    pub async fn validate_transaction(&self, tx: &Transaction) -> ComplianceResult<Decision> {
        let timer = VALIDATION_DURATION.start_timer();

        let (decision, metadata) = self.decide(tx).await?;
        self.record_audit(tx, &decision, metadata).await;

        DECISIONS_TOTAL
            .with_label_values(&[decision.decision.as_str()])
            .inc();
        timer.observe_duration();

        info!(
            tx = %tx.transaction_id,
            customer = %tx.customer_id,
            decision = %decision.decision,
            score = decision.score,
            "Transaction validated"
        );

        Ok(decision)
    }

    async fn decide(&self, tx: &Transaction) -> ComplianceResult<(Decision, serde_json::Value)> {
        let rules = self
            .rule_engine
            .evaluate(&RuleType::AmountThreshold, tx)
            .await?;

        if let Some(rejection) = &rules.rejection {
            let decision = self.aggregator.short_circuit(rejection.reason);
            let metadata = self.short_circuit_metadata(
                ShortCircuit::AmountThreshold,
                &decision,
                &rules,
                json!({ "rule_id": rejection.rule_id }),
            );
            return Ok((decision, metadata));
        }

        let sanctions = self.sanctions.check(tx).await?;

        if let SanctionsOutcome::Blocked { counterparty } = &sanctions {
            let decision = self.aggregator.short_circuit(REASON_SANCTIONED);
            let metadata = self.short_circuit_metadata(
                ShortCircuit::Sanctions,
                &decision,
                &rules,
                json!({ "counterparty": counterparty }),
            );
            return Ok((decision, metadata));
        }

        let breakdown = ScoreBreakdown {
            rules: rules.score,
            sanctions: sanctions.score(),
            external: self.external_score(tx).await,
        };
        let decision = self.aggregator.decide(&breakdown);

        debug!(
            tx = %tx.transaction_id,
            rules = breakdown.rules,
            sanctions = breakdown.sanctions,
            external = breakdown.external,
            score = decision.score,
            "Score aggregated"
        );

        let matched_sanctions_rules: &[Uuid] = match &sanctions {
            SanctionsOutcome::Scored { matched_rules, .. } => matched_rules,
            _ => &[],
        };

        let metadata = json!({
            "score": decision.score,
            "raw_score": breakdown.raw_total(),
            "breakdown": breakdown,
            "sanctions_mode": self.sanctions.mode().as_str(),
            "rules_fired": rules.fired,
            "rules_skipped": rules.skipped,
            "sanctions_rules_matched": matched_sanctions_rules,
        });

        Ok((decision, metadata))
    }

    fn short_circuit_metadata(
        &self,
        cause: ShortCircuit,
        decision: &Decision,
        rules: &RuleEvaluation,
        detail: serde_json::Value,
    ) -> serde_json::Value {
        SHORT_CIRCUIT_TOTAL.with_label_values(&[cause.as_str()]).inc();

        json!({
            "score": decision.score,
            "short_circuit": cause.as_str(),
            "detail": detail,
            "sanctions_mode": self.sanctions.mode().as_str(),
            "rules_fired": rules.fired,
            "rules_skipped": rules.skipped,
        })
    }

    /// Contribution of the external scorer. Any failure counts as zero.
    async fn external_score(&self, tx: &Transaction) -> f64 {
        let payload = FraudPayload::from(tx);

        let result = match tokio::time::timeout(
            self.fraud_timeout,
            self.fraud_scorer.evaluate(&payload),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FraudScorerError::Timeout),
        };

        match result {
            Ok(response) => match response.score() {
                Some(score) => score,
                None => {
                    debug!(tx = %tx.transaction_id, "Fraud scorer returned no usable score");
                    0.0
                }
            },
            Err(e) => {
                warn!(tx = %tx.transaction_id, error = %e, "Fraud scorer unavailable, ignoring");
                FRAUD_SCORER_FAILURES_TOTAL
                    .with_label_values(&[e.cause()])
                    .inc();
                0.0
            }
        }
    }

    async fn record_audit(&self, tx: &Transaction, decision: &Decision, metadata: serde_json::Value) {
        let record = AuditRecord {
            transaction_id: tx.transaction_id.clone(),
            customer_id: tx.customer_id.clone(),
            decision: decision.decision,
            reason: decision.reason.clone(),
            metadata,
        };

        if let Err(e) = self.audit_store.create_audit(&record).await {
            error!(
                tx = %tx.transaction_id,
                customer = %tx.customer_id,
                decision = %decision.decision,
                error = %e,
                "Failed to write audit record"
            );
            AUDIT_WRITE_FAILURES_TOTAL.inc();
        }
    }

    // ===== Customer history =====

    /// Risk in `[0, 1]` from the customer's most recent decisions.
    pub async fn get_risk_score(&self, customer_id: &str) -> ComplianceResult<f64> {
        let audits = self
            .audit_store
            .list_recent_audits(customer_id, self.history.window())
            .await?;

        let score = self.history.score(&audits);
        debug!(customer = %customer_id, audits = audits.len(), score, "Historical risk computed");
        Ok(score)
    }

    // ===== Rule management =====

    pub async fn create_rule(&self, rule: &NewRule) -> ComplianceResult<Rule> {
        self.validate_rule(rule)?;
        let created = self.rule_store.create_rule(rule).await?;
        info!(rule_id = %created.id, rule_type = %created.rule_type, "Rule created");
        Ok(created)
    }

    pub async fn get_rule(&self, id: Uuid) -> ComplianceResult<Rule> {
        self.rule_store
            .get_rule(id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound(format!("rule {}", id)))
    }

    pub async fn list_rules(&self, limit: Option<i64>) -> ComplianceResult<Vec<Rule>> {
        let limit = limit
            .unwrap_or(DEFAULT_RULE_LIST_LIMIT)
            .clamp(1, MAX_RULE_LIST_LIMIT);
        self.rule_store.list_rules(limit).await
    }

    pub async fn update_rule(&self, id: Uuid, rule: &NewRule) -> ComplianceResult<Rule> {
        self.validate_rule(rule)?;
        let updated = self
            .rule_store
            .update_rule(id, rule)
            .await?
            .ok_or_else(|| ComplianceError::NotFound(format!("rule {}", id)))?;
        info!(rule_id = %id, "Rule updated");
        Ok(updated)
    }

    pub async fn delete_rule(&self, id: Uuid) -> ComplianceResult<()> {
        if !self.rule_store.delete_rule(id).await? {
            return Err(ComplianceError::NotFound(format!("rule {}", id)));
        }
        info!(rule_id = %id, "Rule deleted");
        Ok(())
    }

    /// Payloads of evaluable types must parse; other types are stored as-is.
    fn validate_rule(&self, rule: &NewRule) -> ComplianceResult<()> {
        if rule.name.trim().is_empty() {
            return Err(ComplianceError::Validation("rule name must not be empty".to_string()));
        }

        match &rule.rule_type {
            RuleType::AmountThreshold | RuleType::SanctionsList => {
                RuleParams::parse(&rule.rule_type, &rule.params_text())?;
            }
            RuleType::Other(tag) => {
                warn!(rule_type = %tag, "Storing rule of a type with no evaluator");
            }
        }
        Ok(())
    }

    // ===== Sanctions management =====

    pub async fn add_sanction(&self, entry: &NewSanction) -> ComplianceResult<SanctionEntry> {
        if entry.account_id.trim().is_empty() {
            return Err(ComplianceError::Validation("account_id must not be empty".to_string()));
        }
        let stored = self.rule_store.add_sanction(entry).await?;
        info!(account = %stored.account_id, "Sanction entry added");
        Ok(stored)
    }

    pub async fn remove_sanction(&self, account_id: &str) -> ComplianceResult<()> {
        if !self.rule_store.remove_sanction(account_id).await? {
            return Err(ComplianceError::NotFound(format!("sanction entry {}", account_id)));
        }
        info!(account = %account_id, "Sanction entry removed");
        Ok(())
    }
}
