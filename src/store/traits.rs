use thiserror::Error;

use crate::domain::Rule;

/// Errors from rule set lookup.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no rule set configured for organization {0}")]
    NotFound(String),
}

/// Read-only access to per-organization rule sets.
///
/// Implementations return rules ordered by descending priority, with
/// stable insertion order for equal priorities. Callers treat `NotFound`
/// as "evaluate against an empty rule set", not a hard failure.
pub trait RuleStore: Send + Sync {
    fn rules_for(&self, organization_id: &str) -> Result<Vec<Rule>, StoreError>;
}
