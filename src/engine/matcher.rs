use crate::domain::{Expense, Rule, TraceEntry};

/// Output of running every rule against one expense.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Ids of matched rules, in evaluation order
    pub matched_rule_ids: Vec<String>,

    /// Exactly one entry per rule considered
    pub trace: Vec<TraceEntry>,
}

/// Run all rules against an expense, in store order.
///
/// Every rule is evaluated and traced; there is no short-circuiting once
/// a winner is effectively determined, so the trace stays complete for
/// audit purposes. Inactive rules never match but are still traced.
pub fn match_rules(rules: &[Rule], expense: &Expense) -> MatchOutcome {
    let mut matched_rule_ids = Vec::new();
    let mut trace = Vec::with_capacity(rules.len());

    for rule in rules {
        if !rule.active {
            trace.push(TraceEntry::new(&rule.id, "inactive"));
            continue;
        }

        let outcome = rule.predicate.evaluate(expense);
        trace.push(TraceEntry::new(&rule.id, outcome.reason));

        if outcome.matched {
            matched_rule_ids.push(rule.id.clone());
        }
    }

    MatchOutcome {
        matched_rule_ids,
        trace,
    }
}
