use super::{AuditStore, RuleStore};
use crate::errors::{ComplianceError, ComplianceResult};
use crate::models::{
    AuditLog, AuditRecord, DecisionTier, NewRule, NewSanction, Rule, RuleType, SanctionEntry,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL-backed rule store and audit sink. See `schema.sql`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[derive(Debug, FromRow)]
struct RuleRow {
    id: Uuid,
    name: String,
    description: String,
    rule_type: String,
    params: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RuleRow> for Rule {
    fn from(row: RuleRow) -> Self {
        Rule {
            id: row.id,
            name: row.name,
            description: row.description,
            rule_type: RuleType::from(row.rule_type),
            params: row.params,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SanctionRow {
    id: Uuid,
    account_id: String,
    reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SanctionRow> for SanctionEntry {
    fn from(row: SanctionRow) -> Self {
        SanctionEntry {
            id: row.id,
            account_id: row.account_id,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct AuditRow {
    id: Uuid,
    transaction_id: String,
    customer_id: String,
    decision: String,
    reason: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditLog {
    type Error = ComplianceError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let decision: DecisionTier = row.decision.parse().map_err(ComplianceError::Store)?;
        Ok(AuditLog {
            id: row.id,
            transaction_id: row.transaction_id,
            customer_id: row.customer_id,
            decision,
            reason: row.reason,
            metadata: row.metadata,
            created_at: row.created_at,
        })
    }
}

const RULE_COLUMNS: &str = "id, name, description, rule_type, params, created_at, updated_at";

#[async_trait]
impl RuleStore for PgStore {
    async fn find_rules_by_type(&self, rule_type: &RuleType) -> ComplianceResult<Vec<Rule>> {
        let rows = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {} FROM compliance_rules WHERE rule_type = $1 ORDER BY created_at, id",
            RULE_COLUMNS
        ))
        .bind(rule_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        debug!(rule_type = %rule_type, count = rows.len(), "Loaded rules");
        Ok(rows.into_iter().map(Rule::from).collect())
    }

    async fn is_account_sanctioned(&self, account_id: &str) -> ComplianceResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sanctions WHERE account_id = $1)",
        )
        .bind(account_id.trim())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create_rule(&self, rule: &NewRule) -> ComplianceResult<Rule> {
        let row = sqlx::query_as::<_, RuleRow>(&format!(
            "INSERT INTO compliance_rules (id, name, description, rule_type, params, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
             RETURNING {}",
            RULE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&rule.name)
        .bind(&rule.description)
        .bind(rule.rule_type.as_str())
        .bind(rule.params_text())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_rule(&self, id: Uuid) -> ComplianceResult<Option<Rule>> {
        let row = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {} FROM compliance_rules WHERE id = $1",
            RULE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Rule::from))
    }

    async fn list_rules(&self, limit: i64) -> ComplianceResult<Vec<Rule>> {
        let rows = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {} FROM compliance_rules ORDER BY created_at, id LIMIT $1",
            RULE_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Rule::from).collect())
    }

    async fn update_rule(&self, id: Uuid, rule: &NewRule) -> ComplianceResult<Option<Rule>> {
        let row = sqlx::query_as::<_, RuleRow>(&format!(
            "UPDATE compliance_rules
             SET name = $2, description = $3, rule_type = $4, params = $5, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            RULE_COLUMNS
        ))
        .bind(id)
        .bind(&rule.name)
        .bind(&rule.description)
        .bind(rule.rule_type.as_str())
        .bind(rule.params_text())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Rule::from))
    }

    async fn delete_rule(&self, id: Uuid) -> ComplianceResult<bool> {
        let result = sqlx::query("DELETE FROM compliance_rules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_sanction(&self, entry: &NewSanction) -> ComplianceResult<SanctionEntry> {
        let account_id = entry.account_id.trim();
        if account_id.is_empty() {
            return Err(ComplianceError::Validation("account_id must not be empty".to_string()));
        }

        // Re-adding an existing account keeps the first entry.
        let row = sqlx::query_as::<_, SanctionRow>(
            "INSERT INTO sanctions (id, account_id, reason, created_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (account_id) DO UPDATE SET account_id = EXCLUDED.account_id
             RETURNING id, account_id, reason, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(&entry.reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn remove_sanction(&self, account_id: &str) -> ComplianceResult<bool> {
        let result = sqlx::query("DELETE FROM sanctions WHERE account_id = $1")
            .bind(account_id.trim())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn create_audit(&self, record: &AuditRecord) -> ComplianceResult<AuditLog> {
        let row = sqlx::query_as::<_, AuditRow>(
            "INSERT INTO audit_logs (id, transaction_id, customer_id, decision, reason, metadata, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, NOW())
             RETURNING id, transaction_id, customer_id, decision, reason, metadata, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&record.transaction_id)
        .bind(&record.customer_id)
        .bind(record.decision.as_str())
        .bind(&record.reason)
        .bind(&record.metadata)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list_recent_audits(&self, customer_id: &str, limit: i64) -> ComplianceResult<Vec<AuditLog>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT id, transaction_id, customer_id, decision, reason, metadata, created_at
             FROM audit_logs
             WHERE customer_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2",
        )
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AuditLog::try_from).collect()
    }
}
