pub mod matcher;
pub mod resolver;
pub mod service;

pub use matcher::{match_rules, MatchOutcome};
pub use resolver::{resolve, Resolution};
pub use service::{AuditOutcome, EvalError, EvalPhase, Evaluation, EvaluationService};
