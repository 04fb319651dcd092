//! Content hashing, byte sources and file records for deploy uploads.
//!
//! A [`FileRecord`] is the canonical unit handed to the body encoder: a
//! normalized deployment path plus content whose size and MD5 digest were
//! derived exactly once, when the record was built.

mod checksum;
mod mime;
mod record;
mod source;

pub use checksum::checksum_bytes;
pub use mime::{DEFAULT_CONTENT_TYPE, content_type_for, lookup_content_type};
pub use record::FileRecord;
pub use source::{BlobHandle, ByteSource, PathHandle};

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("content of {path} changed since it was hashed")]
    ContentChanged { path: String },
}

impl TransferError {
    /// Wraps an I/O error with the path that caused it.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
