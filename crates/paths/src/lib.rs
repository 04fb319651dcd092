//! Path handling for deploy inputs.
//!
//! Everything in this crate is purely string-based: no filesystem access,
//! no dependency on OS-specific path semantics. Paths are always emitted
//! with `/` separators, whatever separator the caller used.
//!
//! # Stages
//!
//! 1. **Junk filter**: drop OS/editor artifacts and dot-files
//! 2. **Optimizer**: compute the common ancestor and flatten it away
//! 3. **Security**: reject traversal, null bytes and unsafe names

mod junk;
mod optimizer;
mod security;

pub use junk::{filter_junk, is_junk};
pub use optimizer::{find_common_ancestor, normalize_separators, optimize_deploy_paths};
pub use security::validate_upload_path;

/// Maximum length of a single path segment, in characters.
pub const MAX_SEGMENT_LEN: usize = 255;

/// Errors produced when an upload path fails a security check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("file name cannot be empty")]
    Empty,

    #[error("absolute path not allowed: {0}")]
    Absolute(String),

    #[error("parent directory traversal not allowed: {0}")]
    Traversal(String),

    #[error("null byte in path: {0:?}")]
    NullByte(String),

    #[error("unsafe character {ch:?} in path: {path}")]
    UnsafeCharacter { path: String, ch: char },

    #[error("control character in path: {0:?}")]
    ControlCharacter(String),

    #[error("reserved system name {name:?} in path: {path}")]
    ReservedName { path: String, name: String },

    #[error("leading or trailing whitespace in path: {0:?}")]
    Whitespace(String),

    #[error("name ends with a dot: {0}")]
    TrailingDot(String),

    #[error("path segment longer than 255 characters: {0}")]
    SegmentTooLong(String),
}

/// Splits a path on either separator, dropping empty and `.` segments.
pub(crate) fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
}
