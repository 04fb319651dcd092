//! Platform limits and the per-instance cell that holds them.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ValidationError;

/// Business-rule limits published by the platform (`GET /config`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformLimits {
    /// Largest single file, in bytes (inclusive).
    pub max_file_size: u64,
    /// Largest number of non-empty files in one deploy.
    pub max_files_count: usize,
    /// Largest cumulative size, in bytes (inclusive).
    pub max_total_size: u64,
    /// Allowed MIME types. Entries ending in `/` are category prefixes
    /// (`"text/"` covers `"text/plain"`). Empty means unrestricted.
    #[serde(default)]
    pub allowed_mime_types: Vec<String>,
}

impl PlatformLimits {
    /// Returns `true` if `mime_type` is covered by the allow-list.
    pub fn allows_mime(&self, mime_type: &str) -> bool {
        if self.allowed_mime_types.is_empty() {
            return true;
        }
        self.allowed_mime_types.iter().any(|allowed| {
            if allowed.ends_with('/') {
                mime_type.starts_with(allowed.as_str())
            } else {
                mime_type == allowed
            }
        })
    }
}

/// Holds the limits for one deploy context.
///
/// Unset until the first successful fetch; reading before that is a
/// configuration error. Later writes are ignored, so concurrent first
/// fetches racing each other are harmless.
#[derive(Debug, Default)]
pub struct LimitsCell {
    inner: OnceLock<PlatformLimits>,
}

impl LimitsCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the limits unless they are already set.
    pub fn set(&self, limits: PlatformLimits) {
        if self.inner.set(limits).is_err() {
            debug!("platform limits already initialized, keeping existing value");
        }
    }

    /// Returns the limits, or [`ValidationError::LimitsNotInitialized`].
    pub fn get(&self) -> Result<&PlatformLimits, ValidationError> {
        self.inner.get().ok_or(ValidationError::LimitsNotInitialized)
    }

    pub fn is_set(&self) -> bool {
        self.inner.get().is_some()
    }
}
