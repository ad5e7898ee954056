pub mod loader;
pub mod memory;
pub mod traits;

pub use loader::{load_rule_sets, RuleDef, RuleSetError, RuleSetFile};
pub use memory::InMemoryRuleStore;
pub use traits::{RuleStore, StoreError};
