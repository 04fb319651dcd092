//! Platform limits and file-set validation.
//!
//! One rule evaluator ([`RuleEvaluator`]) produces violations for a batch
//! of candidates. Two policies wrap it:
//!
//! - [`FailFast`]: used while scanning real input; the first violation
//!   aborts the whole operation.
//! - [`validate_batch`]: used for pre-flight display; collects every
//!   violation and rejects the batch atomically.

mod candidate;
mod format;
mod limits;
mod policy;
mod rules;

pub use candidate::{CandidateFile, FileStatus};
pub use format::format_bytes;
pub use limits::{LimitsCell, PlatformLimits};
pub use policy::{Admission, FailFast, ValidationOutcome, validate_batch};
pub use rules::{Evaluation, RuleEvaluator, Violation, ViolationKind};

/// Errors produced by validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("platform limits not initialized; fetch them before deploying")]
    LimitsNotInitialized,

    #[error("{0}")]
    Rule(Violation),
}
