pub mod api;
pub mod audit;
pub mod config;
pub mod domain;
pub mod engine;
pub mod observability;
pub mod store;

pub use config::Config;
pub use domain::{Condition, EvaluationResult, Expense, Rule, TraceEntry};
pub use engine::{EvalError, EvaluationService};
