//! Persistence collaborators consumed by the compliance pipeline.
//!
//! The pipeline only reads rules and sanction entries and only appends audit
//! records. Management operations exist for the HTTP surface.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use crate::errors::ComplianceResult;
use crate::models::{AuditLog, AuditRecord, NewRule, NewSanction, Rule, RuleType, SanctionEntry};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Rules of one type, oldest first.
    async fn find_rules_by_type(&self, rule_type: &RuleType) -> ComplianceResult<Vec<Rule>>;
    async fn is_account_sanctioned(&self, account_id: &str) -> ComplianceResult<bool>;

    async fn create_rule(&self, rule: &NewRule) -> ComplianceResult<Rule>;
    async fn get_rule(&self, id: Uuid) -> ComplianceResult<Option<Rule>>;
    async fn list_rules(&self, limit: i64) -> ComplianceResult<Vec<Rule>>;
    async fn update_rule(&self, id: Uuid, rule: &NewRule) -> ComplianceResult<Option<Rule>>;
    async fn delete_rule(&self, id: Uuid) -> ComplianceResult<bool>;

    async fn add_sanction(&self, entry: &NewSanction) -> ComplianceResult<SanctionEntry>;
    async fn remove_sanction(&self, account_id: &str) -> ComplianceResult<bool>;
}

/// Append-only sink for decisions, plus the read path used by history scoring.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn create_audit(&self, record: &AuditRecord) -> ComplianceResult<AuditLog>;
    /// Newest first.
    async fn list_recent_audits(&self, customer_id: &str, limit: i64) -> ComplianceResult<Vec<AuditLog>>;
}
