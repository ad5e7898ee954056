use serde::{Deserialize, Serialize};

/// One trace line per rule considered, in evaluation order.
///
/// Both keys are always present on the wire, even when the reason is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// The rule that was considered
    pub rule: String,

    /// Why the rule matched or did not
    pub reason: String,
}

impl TraceEntry {
    pub fn new(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        TraceEntry {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

/// The complete outcome of evaluating one expense.
///
/// Invariants: `winning_rule`, when present, is an element of
/// `matched_rules`; `actions` is empty iff `winning_rule` is absent;
/// `trace` has one entry per rule registered for the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Ids of all rules whose predicate matched, in evaluation order
    pub matched_rules: Vec<String>,

    /// The single rule selected to determine actions; omitted when no
    /// rule matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_rule: Option<String>,

    /// The winning rule's actions, deduplicated, first occurrence order
    pub actions: Vec<String>,

    /// One entry per rule considered
    pub trace: Vec<TraceEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winning_rule_omitted_when_absent() {
        let result = EvaluationResult {
            matched_rules: vec![],
            winning_rule: None,
            actions: vec![],
            trace: vec![],
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("winning_rule"));
    }

    #[test]
    fn test_trace_entries_carry_both_keys() {
        let result = EvaluationResult {
            matched_rules: vec!["over_limit".to_string()],
            winning_rule: Some("over_limit".to_string()),
            actions: vec!["require_approval".to_string()],
            trace: vec![TraceEntry::new("over_limit", "amount 350 > 300")],
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""rule":"over_limit""#));
        assert!(json.contains(r#""reason":"amount 350 > 300""#));
    }

    #[test]
    fn test_result_round_trip() {
        let result = EvaluationResult {
            matched_rules: vec!["a".to_string()],
            winning_rule: Some("a".to_string()),
            actions: vec!["flag".to_string()],
            trace: vec![TraceEntry::new("a", "amount 500 > 300")],
        };

        let json = serde_json::to_string(&result).unwrap();
        let parsed: EvaluationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
