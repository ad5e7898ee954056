pub mod audit;
pub mod condition;
pub mod expense;
pub mod result;
pub mod rule;

pub use audit::AuditRecord;
pub use condition::{Check, CheckOutcome, CheckValue, CompareOp, Condition};
pub use expense::{Expense, FieldValue};
pub use result::{EvaluationResult, TraceEntry};
pub use rule::Rule;
