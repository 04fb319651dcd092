//! OS/editor artifact filtering and the dot-file policy.

use tracing::debug;

use crate::{MAX_SEGMENT_LEN, split_segments};

/// Directories whose whole subtree is dropped (matched case-insensitively).
const JUNK_DIRECTORIES: &[&str] = &[
    "__MACOSX",
    ".Trashes",
    ".Trash",
    ".fseventsd",
    ".Spotlight-V100",
    ".TemporaryItems",
    ".DocumentRevisions-V100",
    "$RECYCLE.BIN",
    "System Volume Information",
    "@eaDir",
];

/// Exact basenames that are always junk (matched case-insensitively).
const JUNK_FILES: &[&str] = &[
    ".DS_Store",
    ".AppleDouble",
    ".LSOverride",
    ".localized",
    "Icon\r",
    "Thumbs.db",
    "Thumbs.db:encryptable",
    "ehthumbs.db",
    "ehthumbs_vista.db",
    "desktop.ini",
    "npm-debug.log",
];

/// Basename prefixes that mark junk (AppleDouble siblings, office lock files).
const JUNK_PREFIXES: &[&str] = &["._", ".~lock."];

/// The only dot-directory allowed through, and only at the deployment root.
const WELL_KNOWN_DIR: &str = ".well-known";

/// Returns `true` if `path` must be excluded from a deploy.
///
/// A path is junk when any of these hold:
/// - one of its directories is a known artifact directory,
/// - its basename is a known artifact file,
/// - any segment starts with `.` (except a root-level `.well-known` directory),
/// - any segment is longer than [`MAX_SEGMENT_LEN`].
pub fn is_junk(path: &str) -> bool {
    let segments: Vec<&str> = split_segments(path).collect();
    let Some((basename, dirs)) = segments.split_last() else {
        return true;
    };

    if dirs
        .iter()
        .any(|dir| JUNK_DIRECTORIES.iter().any(|j| j.eq_ignore_ascii_case(dir)))
    {
        return true;
    }

    if is_junk_basename(basename) {
        return true;
    }

    for (idx, segment) in segments.iter().enumerate() {
        if segment.starts_with('.') && !is_exempt_dot_dir(idx, segment, segments.len()) {
            return true;
        }
    }

    segments
        .iter()
        .any(|segment| segment.chars().count() > MAX_SEGMENT_LEN)
}

/// Drops junk paths, keeping the order of the rest.
pub fn filter_junk<S: AsRef<str>>(paths: &[S]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.as_ref())
        .filter(|path| {
            let junk = is_junk(path);
            if junk {
                debug!(path = %path, "excluding junk path");
            }
            !junk
        })
        .map(str::to_string)
        .collect()
}

fn is_junk_basename(name: &str) -> bool {
    if JUNK_FILES.iter().any(|j| j.eq_ignore_ascii_case(name)) {
        return true;
    }
    if JUNK_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
        return true;
    }
    // Editor swap and backup files.
    (name.starts_with('.') && name.ends_with(".swp")) || name.ends_with('~')
}

fn is_exempt_dot_dir(idx: usize, segment: &str, total: usize) -> bool {
    idx == 0 && segment == WELL_KNOWN_DIR && total > 1
}
