use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::domain::{Condition, Rule};

/// Errors that can occur during rule set loading.
#[derive(Error, Debug)]
pub enum RuleSetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// On-disk rule set configuration: a version plus rules keyed by
/// organization, in registration order.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSetFile {
    pub version: String,

    #[serde(default)]
    pub organizations: HashMap<String, Vec<RuleDef>>,
}

/// Definition of a single rule as configured.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDef {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Predicate deciding whether the rule matches
    pub when: Condition,

    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub actions: SmallVec<[String; 4]>,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl RuleDef {
    /// Bind this definition to its owning organization.
    pub fn into_rule(self, organization_id: &str) -> Rule {
        Rule {
            id: self.id,
            organization_id: organization_id.to_string(),
            name: self.name,
            predicate: self.when,
            priority: self.priority,
            actions: self.actions,
            active: self.active,
        }
    }
}

/// Load and validate a rule set file.
pub fn load_rule_sets(path: impl AsRef<Path>) -> Result<RuleSetFile, RuleSetError> {
    let content = fs::read_to_string(path)?;
    let file: RuleSetFile = serde_yaml::from_str(&content)?;

    validate(&file)?;

    Ok(file)
}

fn validate(file: &RuleSetFile) -> Result<(), RuleSetError> {
    if file.version.is_empty() {
        return Err(RuleSetError::Validation(
            "rule set version cannot be empty".to_string(),
        ));
    }

    for (organization_id, rules) in &file.organizations {
        let mut seen_ids = HashSet::new();
        for rule in rules {
            if rule.id.is_empty() {
                return Err(RuleSetError::Validation(format!(
                    "empty rule id in organization {}",
                    organization_id
                )));
            }
            if !seen_ids.insert(&rule.id) {
                return Err(RuleSetError::Validation(format!(
                    "duplicate rule id {} in organization {}",
                    rule.id, organization_id
                )));
            }
            // A winning rule must carry at least one action
            if rule.actions.is_empty() {
                return Err(RuleSetError::Validation(format!(
                    "rule {} in organization {} has no actions",
                    rule.id, organization_id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_rule_sets() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
version: "test-1.0"
organizations:
  org123:
    - id: over_limit
      name: Reject large expenses
      priority: 10
      when: {{ field: amount, op: gt, value: 5000 }}
      actions: [require_approval]
    - id: overtime_meal
      priority: 20
      when:
        all:
          - {{ field: amount, op: gt, value: 200 }}
          - {{ field: working_hours, op: gt, value: 12 }}
      actions: [flag]
"#
        )
        .unwrap();

        let loaded = load_rule_sets(file.path()).unwrap();

        assert_eq!(loaded.version, "test-1.0");
        let rules = &loaded.organizations["org123"];
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, "over_limit");
        assert_eq!(rules[0].name, "Reject large expenses");
        assert!(rules[0].active);
        assert_eq!(rules[1].actions.as_slice(), ["flag".to_string()]);
    }

    #[test]
    fn test_validation_empty_version() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "version: \"\"\norganizations: {{}}").unwrap();

        let result = load_rule_sets(file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("version"));
    }

    #[test]
    fn test_validation_duplicate_rule_ids() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
version: "test"
organizations:
  org123:
    - id: r1
      when: {{ field: amount, op: gt, value: 100 }}
      actions: [flag]
    - id: r1
      when: {{ field: amount, op: gt, value: 200 }}
      actions: [flag]
"#
        )
        .unwrap();

        let result = load_rule_sets(file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_validation_rule_without_actions() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
version: "test"
organizations:
  org123:
    - id: actionless
      priority: 10
      when: {{ field: amount, op: gt, value: 100 }}
"#
        )
        .unwrap();

        let result = load_rule_sets(file.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no actions"));
    }

    #[test]
    fn test_into_rule_binds_organization() {
        let def = RuleDef {
            id: "r1".to_string(),
            name: String::new(),
            when: serde_yaml::from_str("{ field: amount, op: gt, value: 100 }").unwrap(),
            priority: 5,
            actions: SmallVec::from_vec(vec!["flag".to_string()]),
            active: true,
        };

        let rule = def.into_rule("org123");

        assert_eq!(rule.organization_id, "org123");
        assert_eq!(rule.priority, 5);
    }
}
