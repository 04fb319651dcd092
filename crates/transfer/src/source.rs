//! Byte sources: owned buffers or opaque readable handles.
//!
//! The ingestion boundary decides once which variant a file is; the rest of
//! the pipeline only ever asks a source for its length or its bytes.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use crate::TransferError;

/// Opaque file content that can be read fully into memory.
///
/// Implemented by embedders that hold file handles (e.g. a UI file
/// picker). The reported length must match what `read_all` returns.
pub trait BlobHandle: Send + Sync + fmt::Debug {
    /// Content length in bytes.
    fn len(&self) -> u64;

    /// Returns `true` if the content is zero bytes long.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the whole content.
    fn read_all(&self) -> Pin<Box<dyn Future<Output = io::Result<Vec<u8>>> + Send + '_>>;
}

/// File content as seen by the pipeline.
#[derive(Clone)]
pub enum ByteSource {
    /// Content already in memory.
    Bytes(Vec<u8>),
    /// Content behind a handle, read on demand.
    Handle(Arc<dyn BlobHandle>),
}

impl ByteSource {
    /// Content length in bytes.
    pub fn len(&self) -> u64 {
        match self {
            Self::Bytes(bytes) => bytes.len() as u64,
            Self::Handle(handle) => handle.len(),
        }
    }

    /// Returns `true` if the content is zero bytes long.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the full content, borrowing when it is already in memory.
    pub async fn read_to_bytes(&self) -> io::Result<Cow<'_, [u8]>> {
        match self {
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
            Self::Handle(handle) => handle.read_all().await.map(Cow::Owned),
        }
    }
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Handle(handle) => f.debug_tuple("Handle").field(handle).finish(),
        }
    }
}

impl From<Vec<u8>> for ByteSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// A [`BlobHandle`] backed by a file on disk, read lazily with `tokio::fs`.
#[derive(Debug, Clone)]
pub struct PathHandle {
    path: PathBuf,
    len: u64,
}

impl PathHandle {
    /// Opens `path`, recording its current size.
    pub fn open(path: &Path) -> Result<Self, TransferError> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| TransferError::io(path.display().to_string(), e))?;
        Ok(Self {
            path: path.to_path_buf(),
            len: metadata.len(),
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobHandle for PathHandle {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_all(&self) -> Pin<Box<dyn Future<Output = io::Result<Vec<u8>>> + Send + '_>> {
        Box::pin(tokio::fs::read(&self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn bytes_source_borrows() {
        let source = ByteSource::from(b"abc".to_vec());
        assert_eq!(source.len(), 3);
        let bytes = source.read_to_bytes().await.unwrap();
        assert!(matches!(bytes, Cow::Borrowed(_)));
        assert_eq!(&*bytes, b"abc");
    }

    #[tokio::test]
    async fn path_handle_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, b"<h1>hi</h1>").unwrap();

        let handle = PathHandle::open(&path).unwrap();
        assert_eq!(handle.len(), 11);
        assert_eq!(handle.path(), path.as_path());

        let source = ByteSource::Handle(Arc::new(handle));
        assert_eq!(source.len(), 11);
        assert_eq!(&*source.read_to_bytes().await.unwrap(), b"<h1>hi</h1>");
    }

    #[test]
    fn path_handle_missing_file_names_path() {
        let err = PathHandle::open(Path::new("/nonexistent/staticship/file.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/staticship/file.txt"));
    }

    #[test]
    fn debug_does_not_dump_content() {
        let source = ByteSource::from(vec![0u8; 4096]);
        assert_eq!(format!("{source:?}"), "Bytes(4096)");
    }
}
