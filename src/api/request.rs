use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Expense;

/// Expense payload for an evaluation request.
///
/// Numeric fields arrive as JSON numbers when present and are omitted
/// entirely (not null) when blank. A missing `expense_id` deserializes to
/// empty so the service can reject it with a proper validation error
/// instead of a deserialization failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseRequest {
    #[serde(default)]
    pub expense_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ExpenseRequest {
    /// Convert to a domain Expense for rule evaluation.
    pub fn into_expense(self) -> Expense {
        Expense {
            expense_id: self.expense_id,
            amount: self.amount,
            category: self.category,
            working_hours: self.working_hours,
            employee_id: self.employee_id,
            merchant: self.merchant,
            submitted_at: self.submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserialization() {
        let json = r#"{
            "expense_id": "exp_1",
            "amount": 350,
            "category": "Food",
            "working_hours": 13,
            "employee_id": "user_101"
        }"#;

        let req: ExpenseRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.expense_id, "exp_1");
        assert_eq!(req.amount, Some(Decimal::new(350, 0)));
        assert_eq!(req.merchant, None);
    }

    #[test]
    fn test_missing_expense_id_defaults_to_empty() {
        let req: ExpenseRequest = serde_json::from_str(r#"{"amount": 100}"#).unwrap();

        assert!(req.expense_id.is_empty());
    }

    #[test]
    fn test_into_expense() {
        let req: ExpenseRequest =
            serde_json::from_str(r#"{"expense_id": "exp_1", "amount": 350.5}"#).unwrap();

        let expense = req.into_expense();

        assert_eq!(expense.expense_id, "exp_1");
        assert_eq!(expense.amount.unwrap().to_string(), "350.5");
    }
}
