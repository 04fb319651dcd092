use std::borrow::Cow;

use crate::TransferError;
use crate::checksum::checksum_bytes;
use crate::source::ByteSource;

/// A processed file ready to be encoded into a deploy body.
///
/// `size` and `digest` are computed from the content once, at construction,
/// and never recomputed. Handle-backed content is read a second time when
/// the body is encoded; [`FileRecord::read_verified`] rejects it if it no
/// longer matches.
#[derive(Debug, Clone)]
pub struct FileRecord {
    path: String,
    content: ByteSource,
    size: u64,
    digest: String,
}

impl FileRecord {
    /// Builds a record from bytes already in memory.
    pub fn from_bytes(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        let digest = checksum_bytes(&bytes);
        Self {
            path: path.into(),
            size: bytes.len() as u64,
            content: ByteSource::Bytes(bytes),
            digest,
        }
    }

    /// Builds a record from any byte source, reading it fully to hash it.
    pub async fn from_source(
        path: impl Into<String>,
        source: ByteSource,
    ) -> Result<Self, TransferError> {
        let path = path.into();
        match source {
            ByteSource::Bytes(bytes) => Ok(Self::from_bytes(path, bytes)),
            ByteSource::Handle(handle) => {
                let bytes = handle
                    .read_all()
                    .await
                    .map_err(|e| TransferError::io(path.clone(), e))?;
                Ok(Self {
                    digest: checksum_bytes(&bytes),
                    size: bytes.len() as u64,
                    content: ByteSource::Handle(handle),
                    path,
                })
            }
        }
    }

    /// Returns the content, failing if it differs from what was hashed.
    ///
    /// Length is always checked. The digest is recomputed only for handles,
    /// since in-memory bytes cannot change after construction.
    pub async fn read_verified(&self) -> Result<Cow<'_, [u8]>, TransferError> {
        let bytes = self
            .content
            .read_to_bytes()
            .await
            .map_err(|e| TransferError::io(self.path.clone(), e))?;

        let changed = bytes.len() as u64 != self.size
            || (matches!(self.content, ByteSource::Handle(_))
                && checksum_bytes(&bytes) != self.digest);
        if changed {
            return Err(TransferError::ContentChanged {
                path: self.path.clone(),
            });
        }
        Ok(bytes)
    }

    /// Deployment-relative path with `/` separators.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content(&self) -> &ByteSource {
        &self.content
    }

    /// Content size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Lowercase hex MD5 of the content.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}
