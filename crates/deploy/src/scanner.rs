//! Filesystem discovery for deploy inputs.
//!
//! Walks directories iteratively with an explicit stack and produces
//! files with paths relative to the directory shared by all inputs,
//! normalized to forward slashes.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use staticship_transfer::{FileRecord, TransferError, content_type_for};
use staticship_validation::PlatformLimits;
use tracing::{debug, warn};

use crate::error::DeployError;
use crate::ingest::{Ingestable, Origin, ingest};

/// A regular file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Canonical location on disk.
    pub path: PathBuf,
    /// Path relative to the base shared by all inputs, `/`-separated.
    pub relative_path: String,
    pub size: u64,
}

/// Discovers every regular file under `inputs`, in input order.
///
/// Inputs are canonicalized and their deepest common directory becomes the
/// base: a directory input counts as itself, a file input as its parent.
/// Every relative path is taken against that base, so files from several
/// inputs keep their distinguishing directories. Directory entries are
/// visited in sorted order. Directories are tracked by canonical path, so
/// symlink cycles and overlapping inputs are walked once.
pub fn discover_files(inputs: &[PathBuf]) -> Result<Vec<DiscoveredFile>, DeployError> {
    let mut roots = Vec::with_capacity(inputs.len());
    for input in inputs {
        let canonical = fs::canonicalize(input).map_err(|e| io_error(input, e))?;
        let metadata = fs::metadata(&canonical).map_err(|e| io_error(input, e))?;
        roots.push((canonical, metadata));
    }

    let base = common_base(roots.iter().map(|(path, metadata)| {
        if metadata.is_dir() {
            path.as_path()
        } else {
            path.parent().unwrap_or(path.as_path())
        }
    }));
    debug!(base = %base.display(), inputs = roots.len(), "resolved discovery base");

    let mut files = Vec::new();
    let mut visited = HashSet::new();
    for (path, metadata) in roots {
        if metadata.is_file() {
            files.push(DiscoveredFile {
                relative_path: relative_to(&base, &path)?,
                path,
                size: metadata.len(),
            });
        } else if metadata.is_dir() {
            walk_dir(&path, &base, &mut visited, &mut files)?;
        }
    }

    Ok(files)
}

/// Deepest directory that contains every root.
fn common_base<'a>(mut roots: impl Iterator<Item = &'a Path>) -> PathBuf {
    let Some(first) = roots.next() else {
        return PathBuf::new();
    };

    let mut base: Vec<Component<'a>> = first.components().collect();
    for root in roots {
        let shared = base
            .iter()
            .zip(root.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        base.truncate(shared);
    }
    base.into_iter().collect()
}

fn relative_to(base: &Path, path: &Path) -> Result<String, DeployError> {
    let rel_path = path
        .strip_prefix(base)
        .map_err(|e| io_error(path, std::io::Error::other(e)))?;
    // Normalize to forward slashes.
    Ok(rel_path.to_string_lossy().replace('\\', "/"))
}

fn walk_dir(
    root: &Path,
    base: &Path,
    visited: &mut HashSet<PathBuf>,
    files: &mut Vec<DiscoveredFile>,
) -> Result<(), DeployError> {
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let canonical = fs::canonicalize(&dir).map_err(|e| io_error(&dir, e))?;
        if !visited.insert(canonical) {
            debug!(dir = %dir.display(), "skipping already visited directory");
            continue;
        }

        let mut entries = fs::read_dir(&dir)
            .map_err(|e| io_error(&dir, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| io_error(&dir, e))?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut subdirs = Vec::new();
        for entry in entries {
            let path = entry.path();
            // Follows symlinks; a dangling link is skipped, not fatal.
            let metadata = match fs::metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            if metadata.is_dir() {
                subdirs.push(path);
            } else if metadata.is_file() {
                files.push(DiscoveredFile {
                    relative_path: relative_to(base, &path)?,
                    path,
                    size: metadata.len(),
                });
            }
        }

        // Reversed so the stack pops them in sorted order.
        stack.extend(subdirs.into_iter().rev());
    }

    Ok(())
}

/// Runs the filesystem inputs through the shared ingestion pipeline.
pub(crate) async fn prepare_paths(
    inputs: &[PathBuf],
    limits: &PlatformLimits,
    flatten: bool,
) -> Result<Vec<FileRecord>, DeployError> {
    let discovered = discover_files(inputs)?;
    debug!(files = discovered.len(), "discovery complete");

    let items = discovered
        .into_iter()
        .map(|file| Ingestable {
            mime_type: content_type_for(&file.relative_path).to_string(),
            path: file.relative_path,
            size: file.size,
            origin: Origin::Disk(file.path),
        })
        .collect();

    ingest(items, limits, flatten).await
}

fn io_error(path: &Path, err: std::io::Error) -> DeployError {
    TransferError::io(path.display().to_string(), err).into()
}
