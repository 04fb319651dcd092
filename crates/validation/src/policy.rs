//! Fail-fast and atomic-batch validation policies.

use serde::Serialize;
use tracing::debug;

use crate::ValidationError;
use crate::candidate::{CandidateFile, FileStatus};
use crate::limits::PlatformLimits;
use crate::rules::{Evaluation, RuleEvaluator, Violation, ViolationKind};

const BLOCKED_MESSAGE: &str = "deploy blocked: other files failed validation";

/// Decision for one candidate under the fail-fast policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// Zero-byte file, silently left out.
    Skipped,
}

/// Abort-on-first-violation policy for scanners that already do I/O.
pub struct FailFast<'a> {
    evaluator: RuleEvaluator<'a>,
}

impl<'a> FailFast<'a> {
    pub fn new(limits: &'a PlatformLimits) -> Self {
        Self {
            evaluator: RuleEvaluator::new(limits),
        }
    }

    /// Admits the next candidate, or returns its first violation.
    pub fn admit(
        &mut self,
        name: &str,
        size: u64,
        mime_type: &str,
    ) -> Result<Admission, ValidationError> {
        match self.evaluator.evaluate(name, size, mime_type) {
            Evaluation::Skip => {
                debug!(file = %name, "skipping empty file");
                Ok(Admission::Skipped)
            }
            Evaluation::Checked(violations) => match violations.into_iter().next() {
                Some(first) => Err(ValidationError::Rule(first)),
                None => Ok(Admission::Accepted),
            },
        }
    }
}

/// Result of an atomic-batch validation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// Every candidate, each with its terminal status.
    pub files: Vec<CandidateFile>,
    /// Candidates with status `Ready`; empty unless `can_proceed`.
    pub accepted_files: Vec<CandidateFile>,
    pub violations: Vec<Violation>,
    /// Non-blocking notices, e.g. empty-file exclusion.
    pub advisories: Vec<String>,
    pub can_proceed: bool,
}

/// Validates a whole batch and accepts or rejects it as one unit.
///
/// Every violation is collected. If there is any, no file is accepted and
/// every pending candidate becomes `ValidationFailed`, including files that
/// passed every rule on their own. Zero-byte files are `Excluded` with an
/// advisory either way, and never block the batch by themselves.
pub fn validate_batch(
    mut candidates: Vec<CandidateFile>,
    limits: &PlatformLimits,
) -> ValidationOutcome {
    let mut evaluator = RuleEvaluator::new(limits);
    let mut violations = Vec::new();
    let mut advisories = Vec::new();
    let mut messages: Vec<Option<String>> = vec![None; candidates.len()];

    for (candidate, message) in candidates.iter_mut().zip(messages.iter_mut()) {
        match candidate.status() {
            FileStatus::Pending => {}
            FileStatus::ProcessingError => {
                let reason = candidate
                    .status_message()
                    .unwrap_or("file could not be processed")
                    .to_string();
                violations.push(Violation::new(
                    &candidate.name,
                    ViolationKind::ProcessingError,
                    format!("{}: {reason}", candidate.name),
                ));
                continue;
            }
            FileStatus::Excluded => {
                if let Some(note) = candidate.status_message() {
                    advisories.push(note.to_string());
                }
                continue;
            }
            FileStatus::Ready | FileStatus::ValidationFailed => continue,
        }

        match evaluator.evaluate(&candidate.name, candidate.size, &candidate.mime_type) {
            Evaluation::Skip => {
                let note = format!("{} is empty and will be excluded", candidate.name);
                candidate.mark_excluded(note.clone());
                advisories.push(note);
            }
            Evaluation::Checked(found) => {
                if !found.is_empty() {
                    let joined: Vec<&str> = found.iter().map(|v| v.message.as_str()).collect();
                    *message = Some(joined.join("; "));
                }
                violations.extend(found);
            }
        }
    }

    let can_proceed = violations.is_empty();
    for (candidate, message) in candidates.iter_mut().zip(messages) {
        if can_proceed {
            candidate.settle(FileStatus::Ready, None);
        } else {
            let message = message.unwrap_or_else(|| BLOCKED_MESSAGE.to_string());
            candidate.settle(FileStatus::ValidationFailed, Some(message));
        }
    }

    let accepted_files: Vec<CandidateFile> = if can_proceed {
        candidates
            .iter()
            .filter(|c| c.status() == FileStatus::Ready)
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    debug!(
        files = candidates.len(),
        accepted = accepted_files.len(),
        violations = violations.len(),
        advisories = advisories.len(),
        "batch validated"
    );

    ValidationOutcome {
        files: candidates,
        accepted_files,
        violations,
        advisories,
        can_proceed,
    }
}
