//! Data types for the deploy flow.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use staticship_transfer::{ByteSource, content_type_for};
use tokio_util::sync::CancellationToken;

/// A file handed over in memory by an embedding application.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    /// Path inside the deployment; either separator, optional leading `/`.
    pub path: String,
    pub source: ByteSource,
    /// Type reported by the embedder. Derived from the extension when absent.
    pub mime_type: Option<String>,
}

impl MemoryFile {
    pub fn new(path: impl Into<String>, source: impl Into<ByteSource>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub(crate) fn resolved_mime_type(&self) -> String {
        self.mime_type
            .clone()
            .unwrap_or_else(|| content_type_for(&self.path).to_string())
    }
}

/// Raw deploy input, one variant per runtime.
#[derive(Debug, Clone)]
pub enum DeployInput {
    /// Files and directories on the local filesystem.
    Paths(Vec<PathBuf>),
    /// Files held in memory or behind handles.
    Files(Vec<MemoryFile>),
}

/// Caller options for one deploy.
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Strip the common parent directory from all paths.
    pub flatten: bool,
    /// Ask the platform whether the upload is an SPA and add a rewrite config.
    pub spa_detect: bool,
    pub labels: Vec<String>,
    /// Identifies the calling tool.
    pub via: Option<String>,
    /// Checked between pipeline stages only, never inside the hashing loop.
    pub cancel: Option<CancellationToken>,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            flatten: true,
            spa_detect: true,
            labels: Vec::new(),
            via: None,
            cancel: None,
        }
    }
}

/// Descriptor returned by the platform for a created deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub deployment: String,
    pub files: u64,
    pub size: u64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Progress event emitted during a deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// Input discovery and hashing started.
    Scanning,
    /// All files processed and validated.
    Prepared { files: usize, bytes: u64 },
    /// An SPA rewrite config was added.
    SpaConfigured,
    /// Body encoded and handed to the transport.
    Uploading,
}
