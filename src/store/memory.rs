use std::collections::HashMap;

use crate::domain::Rule;

use super::loader::RuleSetFile;
use super::traits::{RuleStore, StoreError};

/// In-memory rule store built once at startup.
///
/// Rules are sorted per organization at construction time, so lookups are
/// cheap read-only snapshots.
#[derive(Debug)]
pub struct InMemoryRuleStore {
    version: String,
    rules: HashMap<String, Vec<Rule>>,
}

impl InMemoryRuleStore {
    /// Build a store from a loaded rule set file.
    pub fn from_file(file: RuleSetFile) -> Self {
        let rules = file
            .organizations
            .into_iter()
            .map(|(organization_id, defs)| {
                let rules = defs
                    .into_iter()
                    .map(|def| def.into_rule(&organization_id))
                    .collect();
                (organization_id, rules)
            })
            .collect();

        Self::from_rules(file.version, rules)
    }

    /// Build a store from already-constructed rules.
    pub fn from_rules(version: impl Into<String>, mut rules: HashMap<String, Vec<Rule>>) -> Self {
        for org_rules in rules.values_mut() {
            // Stable sort keeps registration order for equal priorities
            org_rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        }

        InMemoryRuleStore {
            version: version.into(),
            rules,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn organization_count(&self) -> usize {
        self.rules.len()
    }
}

impl RuleStore for InMemoryRuleStore {
    fn rules_for(&self, organization_id: &str) -> Result<Vec<Rule>, StoreError> {
        self.rules
            .get(organization_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(organization_id.to_string()))
    }
}
