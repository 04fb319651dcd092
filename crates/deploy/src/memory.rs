//! In-memory runtime: files supplied by an embedding application.

use staticship_paths::{is_junk, optimize_deploy_paths};
use staticship_transfer::FileRecord;
use staticship_validation::{CandidateFile, PlatformLimits, ValidationOutcome, validate_batch};

use crate::error::DeployError;
use crate::ingest::{Ingestable, Origin, ingest};
use crate::types::MemoryFile;

/// Runs in-memory files through the shared ingestion pipeline.
pub(crate) async fn prepare_files(
    files: Vec<MemoryFile>,
    limits: &PlatformLimits,
    flatten: bool,
) -> Result<Vec<FileRecord>, DeployError> {
    let items = files
        .into_iter()
        .map(|file| Ingestable {
            mime_type: file.resolved_mime_type(),
            size: file.source.len(),
            path: file.path,
            origin: Origin::Memory(file.source),
        })
        .collect();

    ingest(items, limits, flatten).await
}

/// Validates a whole selection for display, without reading any content.
///
/// Junk files are kept in the outcome as `Excluded` with an advisory so a
/// UI can show why they will not be uploaded. Every other file goes through
/// the all-or-nothing batch policy.
pub fn preflight(files: &[MemoryFile], limits: &PlatformLimits) -> ValidationOutcome {
    let raw: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    let names = optimize_deploy_paths(&raw, false);

    let candidates = files
        .iter()
        .zip(names)
        .map(|(file, name)| {
            let junk = is_junk(&name);
            let mut candidate =
                CandidateFile::new(name, file.source.len(), file.resolved_mime_type());
            if junk {
                let note = format!(
                    "{} is a system or hidden file and will be excluded",
                    candidate.name
                );
                candidate.mark_excluded(note);
            }
            candidate
        })
        .collect();

    validate_batch(candidates, limits)
}
