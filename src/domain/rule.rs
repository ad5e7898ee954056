use smallvec::SmallVec;

use super::condition::Condition;

/// A policy rule configured for one organization.
///
/// Rules are read-only during evaluation; the store hands out snapshots
/// ordered by descending priority with stable insertion order for ties.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique identifier within the organization
    pub id: String,

    /// Owning organization
    pub organization_id: String,

    /// Human-readable rule name
    pub name: String,

    /// Predicate deciding whether the rule matches an expense
    pub predicate: Condition,

    /// Higher priority wins when multiple rules match
    pub priority: i32,

    /// Actions prescribed when this rule wins
    pub actions: SmallVec<[String; 4]>,

    /// Inactive rules never match but still appear in the trace
    pub active: bool,
}
