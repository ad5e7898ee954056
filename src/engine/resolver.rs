use std::collections::HashSet;

use crate::domain::Rule;

/// The winning rule and its aggregated actions.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub winning_rule: Option<String>,
    pub actions: Vec<String>,
}

/// Pick the single winning rule from the matched set.
///
/// The matched rule with the highest priority wins; ties break to the
/// earliest position in store order, i.e. first-registered wins. With no
/// matches there is no winner and no actions.
pub fn resolve(matched_rule_ids: &[String], rules: &[Rule]) -> Resolution {
    let mut winner: Option<&Rule> = None;

    for rule in rules {
        if !matched_rule_ids.iter().any(|id| id == &rule.id) {
            continue;
        }
        match winner {
            Some(current) if rule.priority <= current.priority => {}
            _ => winner = Some(rule),
        }
    }

    match winner {
        None => Resolution {
            winning_rule: None,
            actions: Vec::new(),
        },
        Some(rule) => {
            let mut seen = HashSet::new();
            let actions = rule
                .actions
                .iter()
                .filter(|a| seen.insert(a.as_str()))
                .cloned()
                .collect();

            Resolution {
                winning_rule: Some(rule.id.clone()),
                actions,
            }
        }
    }
}
