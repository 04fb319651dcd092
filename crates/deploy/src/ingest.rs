//! Shared ingestion pipeline for both runtimes.
//!
//! Junk filtering, path optimization, security and fail-fast validation all
//! run on metadata before any byte is read. Content is then read and hashed
//! one file at a time, in discovery order. A file whose read length differs
//! from the size it was admitted with is rejected, so limits always apply to
//! the bytes that were hashed.

use std::collections::HashSet;
use std::path::PathBuf;

use staticship_paths::{is_junk, optimize_deploy_paths, validate_upload_path};
use staticship_transfer::{ByteSource, FileRecord, TransferError};
use staticship_validation::{Admission, FailFast, PlatformLimits, Violation, ViolationKind};
use tracing::{debug, info};

use crate::error::DeployError;

/// Where a candidate's bytes come from.
#[derive(Debug, Clone)]
pub(crate) enum Origin {
    Disk(PathBuf),
    Memory(ByteSource),
}

/// A discovered candidate, before any content is read.
#[derive(Debug, Clone)]
pub(crate) struct Ingestable {
    /// Raw relative path as discovered or supplied.
    pub path: String,
    pub size: u64,
    pub mime_type: String,
    pub origin: Origin,
}

/// Turns candidates into hashed file records, aborting on the first violation.
pub(crate) async fn ingest(
    items: Vec<Ingestable>,
    limits: &PlatformLimits,
    flatten: bool,
) -> Result<Vec<FileRecord>, DeployError> {
    let items: Vec<Ingestable> = items
        .into_iter()
        .filter(|item| {
            let junk = is_junk(&item.path);
            if junk {
                debug!(path = %item.path, "dropping junk file");
            }
            !junk
        })
        .collect();

    let raw_paths: Vec<&str> = items.iter().map(|item| item.path.as_str()).collect();
    let paths = optimize_deploy_paths(&raw_paths, flatten);

    let mut policy = FailFast::new(limits);
    let mut seen = HashSet::with_capacity(paths.len());
    let mut admitted = Vec::with_capacity(items.len());
    for (item, path) in items.into_iter().zip(paths) {
        validate_upload_path(&path)?;
        if !seen.insert(path.clone()) {
            return Err(DeployError::DuplicatePath(path));
        }
        match policy.admit(&path, item.size, &item.mime_type)? {
            Admission::Accepted => admitted.push((path, item.size, item.origin)),
            Admission::Skipped => {}
        }
    }

    let mut records = Vec::with_capacity(admitted.len());
    for (path, admitted_size, origin) in admitted {
        let record = match origin {
            Origin::Disk(disk_path) => {
                let bytes = tokio::fs::read(&disk_path)
                    .await
                    .map_err(|e| TransferError::io(disk_path.display().to_string(), e))?;
                FileRecord::from_bytes(path, bytes)
            }
            Origin::Memory(source) => FileRecord::from_source(path, source).await?,
        };
        if record.size() != admitted_size {
            let message = format!(
                "{} read {} bytes but reported {admitted_size}",
                record.path(),
                record.size()
            );
            return Err(DeployError::Validation(Violation::new(
                record.path(),
                ViolationKind::FileSize,
                message,
            )));
        }
        debug!(path = %record.path(), size = record.size(), digest = %record.digest(), "file hashed");
        records.push(record);
    }

    let bytes: u64 = records.iter().map(FileRecord::size).sum();
    info!(files = records.len(), bytes, "deploy input prepared");
    Ok(records)
}
