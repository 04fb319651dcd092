//! The shared rule evaluator.

use std::fmt;

use serde::{Deserialize, Serialize};
use staticship_paths::validate_upload_path;
use staticship_transfer::lookup_content_type;

use crate::format::format_bytes;
use crate::limits::PlatformLimits;

/// Top-level MIME types whose extension must agree with the declared type.
const MEDIA_CATEGORIES: &[&str] = &["text", "image", "audio", "video", "font"];

/// Which rule a [`Violation`] breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Security,
    FileCount,
    FileSize,
    TotalSize,
    MissingMimeType,
    MimeTypeNotAllowed,
    ExtensionMismatch,
    ProcessingError,
}

/// A rule breach attributed to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub file: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(file: &str, kind: ViolationKind, message: String) -> Self {
        Self {
            file: file.to_string(),
            kind,
            message,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of evaluating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Zero-byte file: excluded before any accounting.
    Skip,
    /// Evaluated; empty means the file passed every rule.
    Checked(Vec<Violation>),
}

/// Evaluates candidates of one batch against [`PlatformLimits`].
///
/// Stateful: the file count and running total accumulate over calls, so
/// candidates must be fed in discovery order. The count and cumulative
/// size violations are each reported once, on the file that first crosses
/// the limit.
pub struct RuleEvaluator<'a> {
    limits: &'a PlatformLimits,
    count: usize,
    total: u64,
    count_exceeded: bool,
    total_exceeded: bool,
}

impl<'a> RuleEvaluator<'a> {
    pub fn new(limits: &'a PlatformLimits) -> Self {
        Self {
            limits,
            count: 0,
            total: 0,
            count_exceeded: false,
            total_exceeded: false,
        }
    }

    /// Evaluates the next candidate.
    pub fn evaluate(&mut self, name: &str, size: u64, mime_type: &str) -> Evaluation {
        if size == 0 {
            return Evaluation::Skip;
        }

        let limits = self.limits;
        let mut violations = Vec::new();

        if let Err(e) = validate_upload_path(name) {
            violations.push(Violation::new(name, ViolationKind::Security, e.to_string()));
        }

        self.count += 1;
        if self.count > limits.max_files_count && !self.count_exceeded {
            self.count_exceeded = true;
            violations.push(Violation::new(
                name,
                ViolationKind::FileCount,
                format!(
                    "number of files exceeds limit of {} at {name}",
                    limits.max_files_count
                ),
            ));
        }

        if size > limits.max_file_size {
            violations.push(Violation::new(
                name,
                ViolationKind::FileSize,
                format!(
                    "{name} ({}) exceeds limit of {}",
                    format_bytes(size),
                    format_bytes(limits.max_file_size)
                ),
            ));
        }

        self.total = self.total.saturating_add(size);
        if self.total > limits.max_total_size && !self.total_exceeded {
            self.total_exceeded = true;
            violations.push(Violation::new(
                name,
                ViolationKind::TotalSize,
                format!(
                    "total deploy size exceeds limit of {} when adding {name}",
                    format_bytes(limits.max_total_size)
                ),
            ));
        }

        if let Some(violation) = check_mime(limits, name, mime_type) {
            violations.push(violation);
        }

        Evaluation::Checked(violations)
    }
}

fn check_mime(limits: &PlatformLimits, name: &str, mime_type: &str) -> Option<Violation> {
    if mime_type.is_empty() {
        return Some(Violation::new(
            name,
            ViolationKind::MissingMimeType,
            format!("{name} has no MIME type"),
        ));
    }

    if !limits.allows_mime(mime_type) {
        return Some(Violation::new(
            name,
            ViolationKind::MimeTypeNotAllowed,
            format!("{name}: file type {mime_type} is not allowed"),
        ));
    }

    let expected = lookup_content_type(name)?;
    let declared_category = category(mime_type);
    let expected_category = category(expected);
    let both_media = is_media(declared_category) && is_media(expected_category);
    if both_media && declared_category != expected_category {
        return Some(Violation::new(
            name,
            ViolationKind::ExtensionMismatch,
            format!("{name}: extension does not match MIME type {mime_type} (expected {expected})"),
        ));
    }

    None
}

fn is_media(category: &str) -> bool {
    MEDIA_CATEGORIES.iter().any(|c| *c == category)
}

fn category(mime_type: &str) -> &str {
    mime_type.split('/').next().unwrap_or(mime_type)
}
