use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::audit::AuditStore;
use crate::domain::{AuditRecord, EvaluationResult, Expense};
use crate::observability::MetricsRegistry;
use crate::store::{RuleStore, StoreError};

use super::matcher::match_rules;
use super::resolver::resolve;

/// Phases of one evaluation request.
///
/// `Failed` is reachable only from `Received`, on malformed input. An
/// audit write failure does not fail the request; it completes with a
/// degraded audit outcome instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalPhase {
    Received,
    Matching,
    Resolving,
    Auditing,
    Complete,
    Failed,
}

impl fmt::Display for EvalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvalPhase::Received => "received",
            EvalPhase::Matching => "matching",
            EvalPhase::Resolving => "resolving",
            EvalPhase::Auditing => "auditing",
            EvalPhase::Complete => "complete",
            EvalPhase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Errors that reject an evaluation before any rule runs.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("validation error: {0}")]
    Validation(String),
}

/// Whether the audit append for an evaluation succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    Recorded { audit_id: String },
    Degraded,
}

/// A completed evaluation together with its audit outcome.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub result: EvaluationResult,
    pub audit: AuditOutcome,
}

/// Orchestrates matching, resolution, and audit recording per request.
///
/// Stateless across requests; the rule store and audit store are shared
/// snapshots, so arbitrarily many evaluations may run in parallel.
pub struct EvaluationService {
    store: Arc<dyn RuleStore>,
    audit: Arc<dyn AuditStore>,
    metrics: Arc<MetricsRegistry>,
}

impl EvaluationService {
    pub fn new(
        store: Arc<dyn RuleStore>,
        audit: Arc<dyn AuditStore>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        EvaluationService {
            store,
            audit,
            metrics,
        }
    }

    /// Evaluate one expense against the organization's rule set.
    ///
    /// Fails only on validation; an organization with no configured rule
    /// set evaluates against an empty one, and audit store outages are
    /// reported through the returned `AuditOutcome` rather than an error.
    pub async fn evaluate(
        &self,
        organization_id: &str,
        expense: Expense,
    ) -> Result<Evaluation, EvalError> {
        let mut phase = EvalPhase::Received;

        if expense.expense_id.trim().is_empty() {
            phase = EvalPhase::Failed;
            self.metrics.record_validation_failure();
            debug!(organization_id, phase = %phase, "evaluation rejected");
            return Err(EvalError::Validation("expense_id is required".to_string()));
        }

        let rules = match self.store.rules_for(organization_id) {
            Ok(rules) => rules,
            Err(StoreError::NotFound(_)) => {
                debug!(
                    organization_id,
                    "no rule set configured, evaluating against empty rule set"
                );
                Vec::new()
            }
        };

        phase = EvalPhase::Matching;
        debug!(organization_id, phase = %phase, rules = rules.len(), "matching rules");
        let matched = match_rules(&rules, &expense);
        self.metrics
            .record_rules(rules.len() as u64, matched.matched_rule_ids.len() as u64);

        phase = EvalPhase::Resolving;
        debug!(organization_id, phase = %phase, matched = matched.matched_rule_ids.len(), "resolving winner");
        let resolution = resolve(&matched.matched_rule_ids, &rules);

        let result = EvaluationResult {
            matched_rules: matched.matched_rule_ids,
            winning_rule: resolution.winning_rule,
            actions: resolution.actions,
            trace: matched.trace,
        };

        phase = EvalPhase::Auditing;
        debug!(organization_id, phase = %phase, "recording audit");
        let audit = self.record_audit(organization_id, &expense, &result).await;

        phase = EvalPhase::Complete;
        self.metrics.record_evaluation(result.winning_rule.is_some());
        info!(
            organization_id,
            expense_id = %expense.expense_id,
            matched = result.matched_rules.len(),
            winning_rule = result.winning_rule.as_deref().unwrap_or("-"),
            degraded_audit = matches!(audit, AuditOutcome::Degraded),
            phase = %phase,
            "evaluation complete"
        );

        Ok(Evaluation { result, audit })
    }

    async fn record_audit(
        &self,
        organization_id: &str,
        expense: &Expense,
        result: &EvaluationResult,
    ) -> AuditOutcome {
        let record = match AuditRecord::new(organization_id, expense, result) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    organization_id,
                    expense_id = %expense.expense_id,
                    error = %e,
                    "Failed to serialize audit record"
                );
                self.metrics.record_audit_write(false);
                return AuditOutcome::Degraded;
            }
        };

        match self.audit.record(&record).await {
            Ok(()) => {
                self.metrics.record_audit_write(true);
                AuditOutcome::Recorded {
                    audit_id: record.id,
                }
            }
            Err(e) => {
                // The evaluation response is still returned; the failed write
                // is left to operational reconciliation.
                warn!(
                    organization_id,
                    expense_id = %expense.expense_id,
                    error = %e,
                    "Failed to record audit"
                );
                self.metrics.record_audit_write(false);
                AuditOutcome::Degraded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::InMemoryAuditStore;
    use crate::domain::{Check, CheckValue, CompareOp, Condition, Rule};
    use crate::store::InMemoryRuleStore;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use smallvec::smallvec;
    use std::collections::HashMap;

    #[derive(Debug)]
    struct FailingAuditStore;

    #[async_trait]
    impl AuditStore for FailingAuditStore {
        async fn record(&self, _record: &AuditRecord) -> anyhow::Result<()> {
            anyhow::bail!("audit store unavailable")
        }

        async fn recent(
            &self,
            _organization_id: &str,
            _limit: usize,
        ) -> anyhow::Result<Vec<AuditRecord>> {
            anyhow::bail!("audit store unavailable")
        }
    }

    fn over_limit_rule() -> Rule {
        Rule {
            id: "over_limit".to_string(),
            organization_id: "org123".to_string(),
            name: "Over spending limit".to_string(),
            predicate: Condition::Check(Check {
                field: "amount".to_string(),
                op: CompareOp::Gt,
                value: CheckValue::Number(Decimal::new(300, 0)),
            }),
            priority: 10,
            actions: smallvec!["require_approval".to_string()],
            active: true,
        }
    }

    fn service_with_rules(rules: Vec<Rule>) -> (EvaluationService, Arc<InMemoryAuditStore>) {
        let store = InMemoryRuleStore::from_rules(
            "test-1",
            HashMap::from([("org123".to_string(), rules)]),
        );
        let audit = Arc::new(InMemoryAuditStore::new(200));
        let service = EvaluationService::new(
            Arc::new(store),
            audit.clone(),
            Arc::new(MetricsRegistry::new()),
        );
        (service, audit)
    }

    fn expense(amount: i64) -> Expense {
        Expense {
            amount: Some(Decimal::new(amount, 0)),
            category: Some("Food".to_string()),
            ..Expense::new("exp_1")
        }
    }

    #[tokio::test]
    async fn test_end_to_end_example() {
        let (service, audit) = service_with_rules(vec![over_limit_rule()]);

        let evaluation = service.evaluate("org123", expense(350)).await.unwrap();
        let result = &evaluation.result;

        assert_eq!(result.matched_rules, vec!["over_limit"]);
        assert_eq!(result.winning_rule, Some("over_limit".to_string()));
        assert_eq!(result.actions, vec!["require_approval"]);
        assert_eq!(result.trace.len(), 1);
        assert_eq!(result.trace[0].rule, "over_limit");
        assert_eq!(result.trace[0].reason, "amount 350 > 300");

        assert!(matches!(evaluation.audit, AuditOutcome::Recorded { .. }));
        let records = audit.recent("org123", 10).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_expense_id_rejected() {
        let (service, audit) = service_with_rules(vec![over_limit_rule()]);

        let err = service
            .evaluate("org123", Expense::new(""))
            .await
            .unwrap_err();

        assert!(matches!(err, EvalError::Validation(_)));
        assert!(err.to_string().contains("expense_id"));

        // Rejected before any rule evaluation, so nothing was audited
        assert!(audit.recent("org123", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_match_means_no_winner_and_no_actions() {
        let (service, _) = service_with_rules(vec![over_limit_rule()]);

        let evaluation = service.evaluate("org123", expense(100)).await.unwrap();
        let result = &evaluation.result;

        assert!(result.matched_rules.is_empty());
        assert_eq!(result.winning_rule, None);
        assert!(result.actions.is_empty());
        assert_eq!(result.trace.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_org_degrades_to_empty_rule_set() {
        let (service, _) = service_with_rules(vec![over_limit_rule()]);

        let evaluation = service.evaluate("other_org", expense(350)).await.unwrap();

        assert!(evaluation.result.matched_rules.is_empty());
        assert_eq!(evaluation.result.winning_rule, None);
        assert!(evaluation.result.trace.is_empty());
    }

    #[tokio::test]
    async fn test_missing_amount_reason() {
        let (service, _) = service_with_rules(vec![over_limit_rule()]);

        let evaluation = service
            .evaluate("org123", Expense::new("exp_1"))
            .await
            .unwrap();

        assert!(evaluation.result.matched_rules.is_empty());
        assert!(evaluation.result.trace[0].reason.contains("amount missing"));
    }

    #[tokio::test]
    async fn test_idempotent_byte_identical_results() {
        let (service, _) = service_with_rules(vec![over_limit_rule()]);

        let first = service.evaluate("org123", expense(350)).await.unwrap();
        let second = service.evaluate("org123", expense(350)).await.unwrap();

        let first_json = serde_json::to_string(&first.result).unwrap();
        let second_json = serde_json::to_string(&second.result).unwrap();
        assert_eq!(first_json, second_json);
    }

    #[tokio::test]
    async fn test_winning_rule_always_in_matched_rules() {
        let mut high = over_limit_rule();
        high.id = "high".to_string();
        high.priority = 30;
        let (service, _) = service_with_rules(vec![over_limit_rule(), high]);

        for amount in [100, 301, 5000] {
            let evaluation = service.evaluate("org123", expense(amount)).await.unwrap();
            let result = &evaluation.result;

            if let Some(winner) = &result.winning_rule {
                assert!(result.matched_rules.contains(winner));
                assert!(!result.actions.is_empty());
            } else {
                assert!(result.actions.is_empty());
            }
        }
    }

    #[tokio::test]
    async fn test_audit_failure_still_returns_result() {
        let store = InMemoryRuleStore::from_rules(
            "test-1",
            HashMap::from([("org123".to_string(), vec![over_limit_rule()])]),
        );
        let service = EvaluationService::new(
            Arc::new(store),
            Arc::new(FailingAuditStore),
            Arc::new(MetricsRegistry::new()),
        );

        let evaluation = service.evaluate("org123", expense(350)).await.unwrap();

        assert_eq!(
            evaluation.result.winning_rule,
            Some("over_limit".to_string())
        );
        assert_eq!(evaluation.audit, AuditOutcome::Degraded);
    }
}
