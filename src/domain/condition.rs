use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::expense::{Expense, FieldValue};

/// Comparison operator for a leaf check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    In,
    Contains,
    StartsWith,
}

impl CompareOp {
    /// Symbol used in trace reasons.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Eq => "==",
            CompareOp::In => "in",
            CompareOp::Contains => "contains",
            CompareOp::StartsWith => "starts_with",
        }
    }
}

/// Right-hand side of a leaf check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckValue {
    Number(Decimal),
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for CheckValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckValue::Number(n) => write!(f, "{}", n),
            CheckValue::Text(s) => write!(f, "{}", s),
            CheckValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// A single field comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub field: String,
    pub op: CompareOp,
    pub value: CheckValue,
}

/// A rule predicate: a tree of combinators over leaf checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
    #[serde(untagged)]
    Check(Check),
}

/// Outcome of evaluating a condition against one expense.
///
/// The reason states why the condition matched or did not, and feeds
/// directly into the evaluation trace.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub matched: bool,
    pub reason: String,
}

impl CheckOutcome {
    pub fn hit(reason: impl Into<String>) -> Self {
        CheckOutcome {
            matched: true,
            reason: reason.into(),
        }
    }

    pub fn miss(reason: impl Into<String>) -> Self {
        CheckOutcome {
            matched: false,
            reason: reason.into(),
        }
    }
}

impl Condition {
    /// Evaluate this condition against an expense.
    ///
    /// Pure and side-effect-free: identical inputs always produce the same
    /// outcome, which is what makes audit records reproducible. Comparisons
    /// against absent fields never raise; they miss with a "missing" reason.
    pub fn evaluate(&self, expense: &Expense) -> CheckOutcome {
        match self {
            Condition::All(children) => {
                let outcomes: Vec<CheckOutcome> =
                    children.iter().map(|c| c.evaluate(expense)).collect();
                CheckOutcome {
                    matched: outcomes.iter().all(|o| o.matched),
                    reason: join_reasons(&outcomes, " && "),
                }
            }
            Condition::Any(children) => {
                let outcomes: Vec<CheckOutcome> =
                    children.iter().map(|c| c.evaluate(expense)).collect();
                CheckOutcome {
                    matched: outcomes.iter().any(|o| o.matched),
                    reason: join_reasons(&outcomes, " || "),
                }
            }
            Condition::Not(inner) => {
                let outcome = inner.evaluate(expense);
                CheckOutcome {
                    matched: !outcome.matched,
                    reason: format!("not ({})", outcome.reason),
                }
            }
            Condition::Check(check) => check.evaluate(expense),
        }
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn join_reasons(outcomes: &[CheckOutcome], sep: &str) -> String {
    outcomes
        .iter()
        .map(|o| o.reason.as_str())
        .collect::<Vec<_>>()
        .join(sep)
}

impl Check {
    /// Evaluate this check against an expense.
    pub fn evaluate(&self, expense: &Expense) -> CheckOutcome {
        let Some(actual) = expense.field(&self.field) else {
            return CheckOutcome::miss(format!("{} missing", self.field));
        };

        let matched = match (self.op, &actual, &self.value) {
            (CompareOp::Gt, FieldValue::Number(n), CheckValue::Number(v)) => n > v,
            (CompareOp::Gte, FieldValue::Number(n), CheckValue::Number(v)) => n >= v,
            (CompareOp::Lt, FieldValue::Number(n), CheckValue::Number(v)) => n < v,
            (CompareOp::Lte, FieldValue::Number(n), CheckValue::Number(v)) => n <= v,
            (CompareOp::Eq, FieldValue::Number(n), CheckValue::Number(v)) => n == v,
            // Equality on strings is case-sensitive exact match
            (CompareOp::Eq, FieldValue::Text(s), CheckValue::Text(v)) => s == v,
            (CompareOp::In, FieldValue::Text(s), CheckValue::List(items)) => {
                items.iter().any(|item| item == s)
            }
            // Substring match is case-insensitive
            (CompareOp::Contains, FieldValue::Text(s), CheckValue::Text(v)) => {
                s.to_lowercase().contains(&v.to_lowercase())
            }
            (CompareOp::StartsWith, FieldValue::Text(s), CheckValue::Text(v)) => s.starts_with(v),
            // Timestamps compare against RFC 3339 strings
            (op, FieldValue::Timestamp(t), CheckValue::Text(v)) => {
                let Some(expected) = parse_timestamp(v) else {
                    return CheckOutcome::miss(format!(
                        "{} {} not comparable to {}",
                        self.field, actual, self.value
                    ));
                };
                match op {
                    CompareOp::Gt => *t > expected,
                    CompareOp::Gte => *t >= expected,
                    CompareOp::Lt => *t < expected,
                    CompareOp::Lte => *t <= expected,
                    CompareOp::Eq => *t == expected,
                    _ => {
                        return CheckOutcome::miss(format!(
                            "{} {} not comparable to {}",
                            self.field, actual, self.value
                        ));
                    }
                }
            }
            // Operand types don't line up with the operator
            _ => {
                return CheckOutcome::miss(format!(
                    "{} {} not comparable to {}",
                    self.field, actual, self.value
                ));
            }
        };

        if matched {
            CheckOutcome::hit(format!(
                "{} {} {} {}",
                self.field,
                actual,
                self.op.symbol(),
                self.value
            ))
        } else {
            CheckOutcome::miss(format!(
                "{} {} not {} {}",
                self.field,
                actual,
                self.op.symbol(),
                self.value
            ))
        }
    }
}
