use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A submitted expense under evaluation.
///
/// Any field other than `expense_id` may be absent. Absent means "unknown",
/// never zero; conditions over an absent field evaluate to not-matched
/// rather than erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier per request
    pub expense_id: String,

    /// Expense amount in the organization's currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    /// Expense category (e.g., "Food", "Travel")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Hours worked on the day of the expense
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<Decimal>,

    /// Submitting employee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,

    /// Merchant name as it appears on the receipt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,

    /// When the expense was submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A single expense field value, as seen by condition checks.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(Decimal),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Timestamp(t) => {
                write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
        }
    }
}

impl Expense {
    /// Create an expense with only the required identifier set.
    pub fn new(expense_id: impl Into<String>) -> Self {
        Expense {
            expense_id: expense_id.into(),
            amount: None,
            category: None,
            working_hours: None,
            employee_id: None,
            merchant: None,
            submitted_at: None,
        }
    }

    /// Look up a field by name for condition evaluation.
    ///
    /// Returns None when the field is absent or unknown.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "expense_id" => Some(FieldValue::Text(self.expense_id.clone())),
            "amount" => self.amount.map(FieldValue::Number),
            "category" => self.category.clone().map(FieldValue::Text),
            "working_hours" => self.working_hours.map(FieldValue::Number),
            "employee_id" => self.employee_id.clone().map(FieldValue::Text),
            "merchant" => self.merchant.clone().map(FieldValue::Text),
            "submitted_at" => self.submitted_at.map(FieldValue::Timestamp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        let expense = Expense {
            amount: Some(Decimal::new(350, 0)),
            category: Some("Food".to_string()),
            ..Expense::new("exp_1")
        };

        assert_eq!(
            expense.field("amount"),
            Some(FieldValue::Number(Decimal::new(350, 0)))
        );
        assert_eq!(
            expense.field("category"),
            Some(FieldValue::Text("Food".to_string()))
        );
        assert_eq!(expense.field("working_hours"), None);
        assert_eq!(expense.field("nonexistent"), None);
    }

    #[test]
    fn test_submitted_at_lookup() {
        let submitted: DateTime<Utc> = "2025-08-01T10:30:00Z".parse().unwrap();
        let expense = Expense {
            submitted_at: Some(submitted),
            ..Expense::new("exp_1")
        };

        assert_eq!(
            expense.field("submitted_at"),
            Some(FieldValue::Timestamp(submitted))
        );
        assert_eq!(
            FieldValue::Timestamp(submitted).to_string(),
            "2025-08-01T10:30:00Z"
        );
    }

    #[test]
    fn test_absent_fields_omitted_from_json() {
        let expense = Expense::new("exp_1");
        let json = serde_json::to_string(&expense).unwrap();

        assert_eq!(json, r#"{"expense_id":"exp_1"}"#);
    }

    #[test]
    fn test_deserialize_with_numeric_fields() {
        let json = r#"{"expense_id":"exp_1","amount":350,"working_hours":13}"#;
        let expense: Expense = serde_json::from_str(json).unwrap();

        assert_eq!(expense.amount, Some(Decimal::new(350, 0)));
        assert_eq!(expense.working_hours, Some(Decimal::new(13, 0)));
        assert_eq!(expense.category, None);
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Number(Decimal::new(350, 0)).to_string(), "350");
        assert_eq!(FieldValue::Text("Food".to_string()).to_string(), "Food");
    }
}
