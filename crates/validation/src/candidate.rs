use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`CandidateFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Pending,
    Ready,
    Excluded,
    ValidationFailed,
    ProcessingError,
}

impl FileStatus {
    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }
}

/// A file as shown to a user before the deploy is committed.
///
/// Created `Pending`; settles into exactly one terminal status and never
/// moves again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    status: FileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_message: Option<String>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            status: FileStatus::Pending,
            status_message: None,
        }
    }

    pub fn status(&self) -> FileStatus {
        self.status
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Marks a file that could not be inspected at ingestion.
    pub fn mark_processing_error(&mut self, message: impl Into<String>) -> bool {
        self.settle(FileStatus::ProcessingError, Some(message.into()))
    }

    /// Marks a file excluded from the deploy (not an error).
    pub fn mark_excluded(&mut self, message: impl Into<String>) -> bool {
        self.settle(FileStatus::Excluded, Some(message.into()))
    }

    /// Moves a pending file to `status`. Returns `false`, leaving the file
    /// untouched, if it already settled.
    pub(crate) fn settle(&mut self, status: FileStatus, message: Option<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = status;
        self.status_message = message;
        true
    }
}
