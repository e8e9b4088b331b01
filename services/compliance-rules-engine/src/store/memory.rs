use super::{AuditStore, RuleStore};
use crate::errors::{ComplianceError, ComplianceResult};
use crate::models::{AuditLog, AuditRecord, NewRule, NewSanction, Rule, RuleType, SanctionEntry};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Process-local store used for tests and database-less runs.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    rules: Arc<DashMap<Uuid, Rule>>,
    // account_id -> entry
    sanctions: Arc<DashMap<String, SanctionEntry>>,
    audits: Arc<RwLock<Vec<AuditLog>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule with an explicit, possibly malformed, raw payload.
    pub fn insert_raw_rule(&self, name: &str, rule_type: RuleType, params: &str) -> Rule {
        self.insert(name, String::new(), rule_type, params)
    }

    fn insert(&self, name: &str, description: String, rule_type: RuleType, params: &str) -> Rule {
        let now = Utc::now();
        let rule = Rule {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description,
            rule_type,
            params: params.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.rules.insert(rule.id, rule.clone());
        rule
    }

    pub fn audits(&self) -> Vec<AuditLog> {
        self.audits.read().clone()
    }

    fn sorted_rules<F>(&self, filter: F) -> Vec<Rule>
    where
        F: Fn(&Rule) -> bool,
    {
        let mut rules: Vec<Rule> = self
            .rules
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        rules.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        rules
    }
}

#[async_trait]
impl RuleStore for InMemoryStore {
    async fn find_rules_by_type(&self, rule_type: &RuleType) -> ComplianceResult<Vec<Rule>> {
        Ok(self.sorted_rules(|rule| &rule.rule_type == rule_type))
    }

    async fn is_account_sanctioned(&self, account_id: &str) -> ComplianceResult<bool> {
        Ok(self.sanctions.contains_key(account_id.trim()))
    }

    async fn create_rule(&self, rule: &NewRule) -> ComplianceResult<Rule> {
        Ok(self.insert(
            &rule.name,
            rule.description.clone(),
            rule.rule_type.clone(),
            &rule.params_text(),
        ))
    }

    async fn get_rule(&self, id: Uuid) -> ComplianceResult<Option<Rule>> {
        Ok(self.rules.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_rules(&self, limit: i64) -> ComplianceResult<Vec<Rule>> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(self.sorted_rules(|_| true).into_iter().take(limit).collect())
    }

    async fn update_rule(&self, id: Uuid, rule: &NewRule) -> ComplianceResult<Option<Rule>> {
        Ok(self.rules.get_mut(&id).map(|mut entry| {
            let stored = entry.value_mut();
            stored.name = rule.name.clone();
            stored.description = rule.description.clone();
            stored.rule_type = rule.rule_type.clone();
            stored.params = rule.params_text();
            stored.updated_at = Utc::now();
            stored.clone()
        }))
    }

    async fn delete_rule(&self, id: Uuid) -> ComplianceResult<bool> {
        Ok(self.rules.remove(&id).is_some())
    }

    async fn add_sanction(&self, entry: &NewSanction) -> ComplianceResult<SanctionEntry> {
        let account_id = entry.account_id.trim();
        if account_id.is_empty() {
            return Err(ComplianceError::Validation("account_id must not be empty".to_string()));
        }

        let stored = self
            .sanctions
            .entry(account_id.to_string())
            .or_insert_with(|| SanctionEntry {
                id: Uuid::new_v4(),
                account_id: account_id.to_string(),
                reason: entry.reason.clone(),
                created_at: Utc::now(),
            });
        Ok(stored.value().clone())
    }

    async fn remove_sanction(&self, account_id: &str) -> ComplianceResult<bool> {
        Ok(self.sanctions.remove(account_id.trim()).is_some())
    }
}

#[async_trait]
impl AuditStore for InMemoryStore {
    async fn create_audit(&self, record: &AuditRecord) -> ComplianceResult<AuditLog> {
        let log = AuditLog {
            id: Uuid::new_v4(),
            transaction_id: record.transaction_id.clone(),
            customer_id: record.customer_id.clone(),
            decision: record.decision,
            reason: record.reason.clone(),
            metadata: record.metadata.clone(),
            created_at: Utc::now(),
        };
        self.audits.write().push(log.clone());
        Ok(log)
    }

    async fn list_recent_audits(&self, customer_id: &str, limit: i64) -> ComplianceResult<Vec<AuditLog>> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let audits = self.audits.read();
        Ok(audits
            .iter()
            .rev()
            .filter(|log| log.customer_id == customer_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DecisionTier;

    fn audit(customer: &str, decision: DecisionTier) -> AuditRecord {
        AuditRecord {
            transaction_id: Uuid::new_v4().to_string(),
            customer_id: customer.to_string(),
            decision,
            reason: String::new(),
            metadata: serde_json::json!({"score": 0.0}),
        }
    }

    #[tokio::test]
    async fn test_find_rules_by_type_filters() {
        let store = InMemoryStore::new();
        store.insert_raw_rule("a", RuleType::AmountThreshold, r#"{"threshold": 1}"#);
        store.insert_raw_rule("b", RuleType::SanctionsList, "ACC-1");
        store.insert_raw_rule("c", RuleType::AmountThreshold, r#"{"threshold": 2}"#);

        let rules = store.find_rules_by_type(&RuleType::AmountThreshold).await.unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|r| r.rule_type == RuleType::AmountThreshold));
    }

    #[tokio::test]
    async fn test_sanction_lookup_is_exact() {
        let store = InMemoryStore::new();
        store
            .add_sanction(&NewSanction { account_id: "ACC-BAD".into(), reason: None })
            .await
            .unwrap();

        assert!(store.is_account_sanctioned("ACC-BAD").await.unwrap());
        assert!(!store.is_account_sanctioned("ACC-BAD-2").await.unwrap());
        assert!(!store.is_account_sanctioned("ACC").await.unwrap());
        assert!(store.is_account_sanctioned(" ACC-BAD\t").await.unwrap());

        assert!(store.remove_sanction("ACC-BAD ").await.unwrap());
        assert!(!store.is_account_sanctioned("ACC-BAD").await.unwrap());
    }

    #[tokio::test]
    async fn test_recent_audits_newest_first_and_limited() {
        let store = InMemoryStore::new();
        store.create_audit(&audit("c1", DecisionTier::Approve)).await.unwrap();
        store.create_audit(&audit("c2", DecisionTier::Reject)).await.unwrap();
        store.create_audit(&audit("c1", DecisionTier::Review)).await.unwrap();
        store.create_audit(&audit("c1", DecisionTier::Reject)).await.unwrap();

        let recent = store.list_recent_audits("c1", 2).await.unwrap();
        let tiers: Vec<_> = recent.iter().map(|a| a.decision).collect();
        assert_eq!(tiers, vec![DecisionTier::Reject, DecisionTier::Review]);
    }

    #[tokio::test]
    async fn test_rule_crud() {
        let store = InMemoryStore::new();
        let new_rule: NewRule = serde_json::from_value(serde_json::json!({
            "name": "large",
            "description": "large transfers",
            "type": "amount_threshold",
            "params": {"threshold": 100, "weight": 0.3}
        }))
        .unwrap();

        let created = store.create_rule(&new_rule).await.unwrap();
        assert_eq!(created.description, "large transfers");
        assert_eq!(store.get_rule(created.id).await.unwrap(), Some(created.clone()));

        let renamed = NewRule { name: "larger".into(), ..new_rule };
        let updated = store.update_rule(created.id, &renamed).await.unwrap().unwrap();
        assert_eq!(updated.name, "larger");

        assert!(store.delete_rule(created.id).await.unwrap());
        assert!(store.get_rule(created.id).await.unwrap().is_none());
        assert!(store.update_rule(created.id, &renamed).await.unwrap().is_none());
    }
}
