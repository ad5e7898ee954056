use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::expense::Expense;
use super::result::EvaluationResult;

/// Immutable log entry pairing an expense with its evaluation result.
///
/// `expense_json` and `result_json` are always serialized JSON strings,
/// never embedded objects; consumers parse them. Wire field names are
/// fixed by the admin console contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Generated identifier, prefixed "aud_"
    pub id: String,

    #[serde(rename = "orgId")]
    pub organization_id: String,

    /// Serialized Expense
    pub expense_json: String,

    /// Serialized EvaluationResult
    pub result_json: String,

    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Build a record for one completed evaluation.
    pub fn new(
        organization_id: impl Into<String>,
        expense: &Expense,
        result: &EvaluationResult,
    ) -> serde_json::Result<Self> {
        Ok(AuditRecord {
            id: format!("aud_{}", Uuid::new_v4().simple()),
            organization_id: organization_id.into(),
            expense_json: serde_json::to_string(expense)?,
            result_json: serde_json::to_string(result)?,
            created_at: Utc::now(),
        })
    }
}
