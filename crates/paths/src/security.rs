//! Upload path security checks.
//!
//! These run once per candidate before any byte of it is read, so a
//! rejected file never costs I/O.

use crate::{MAX_SEGMENT_LEN, PathError};

/// Characters that are never allowed in an uploaded file name.
const UNSAFE_CHARS: &[char] = &[
    '?', '&', '#', '%', '<', '>', '[', ']', '{', '}', '|', '\\', '^', '~', '`', ';', '$', '(',
    ')', '\'', '"', '*',
];

/// Windows device names, reserved with or without an extension.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Validates a deployment-relative upload path.
///
/// Rejects:
/// - Empty paths and empty segments
/// - Absolute paths
/// - Parent directory traversal (`..`, with either separator)
/// - Null bytes and other control characters
/// - Unsafe characters, reserved device names
/// - Segments with leading/trailing whitespace or a trailing dot
/// - Segments longer than [`MAX_SEGMENT_LEN`]
///
/// Nested paths and dot-files are accepted; the dot-file policy belongs
/// to the junk filter.
pub fn validate_upload_path(path: &str) -> Result<(), PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    // Checked first so they win over every other rule.
    if path.contains('\0') {
        return Err(PathError::NullByte(path.to_string()));
    }
    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(PathError::Traversal(path.to_string()));
    }

    if path.starts_with('/') {
        return Err(PathError::Absolute(path.to_string()));
    }

    for segment in path.split('/') {
        validate_segment(path, segment)?;
    }

    Ok(())
}

fn validate_segment(path: &str, segment: &str) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::Empty);
    }
    if segment.chars().any(char::is_control) {
        return Err(PathError::ControlCharacter(path.to_string()));
    }
    if let Some(ch) = segment.chars().find(|c| UNSAFE_CHARS.contains(c)) {
        return Err(PathError::UnsafeCharacter {
            path: path.to_string(),
            ch,
        });
    }
    if segment.trim() != segment {
        return Err(PathError::Whitespace(path.to_string()));
    }
    if segment.ends_with('.') {
        return Err(PathError::TrailingDot(path.to_string()));
    }
    if segment.chars().count() > MAX_SEGMENT_LEN {
        return Err(PathError::SegmentTooLong(path.to_string()));
    }

    let stem = segment.split('.').next().unwrap_or(segment);
    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(stem)) {
        return Err(PathError::ReservedName {
            path: path.to_string(),
            name: segment.to_string(),
        });
    }

    Ok(())
}
