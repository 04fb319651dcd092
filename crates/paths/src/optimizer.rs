//! Common-ancestor computation and path flattening.

use crate::split_segments;

/// Converts every `\` to `/`.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Returns the longest common ancestor shared by all `paths`.
///
/// Comparison is segment-exact, so `app` and `application` never share a
/// prefix. Empty entries are ignored. Returns an empty string when there is
/// no common ancestor. A single input is returned as-is (normalized). The
/// result keeps a leading `/` only when every input has one, so mixed
/// absolute and relative inputs compare as relative regardless of order.
pub fn find_common_ancestor<S: AsRef<str>>(paths: &[S]) -> String {
    let normalized: Vec<String> = paths
        .iter()
        .map(|p| p.as_ref())
        .filter(|p| !p.is_empty())
        .map(normalize_separators)
        .collect();

    let [first, rest @ ..] = normalized.as_slice() else {
        return String::new();
    };
    if rest.is_empty() {
        return first.clone();
    }

    let first_segments: Vec<&str> = split_segments(first).collect();
    let mut common = first_segments.len();
    for path in rest {
        common = first_segments
            .iter()
            .take(common)
            .zip(split_segments(path))
            .take_while(|(a, b)| **a == *b)
            .count();
        if common == 0 {
            return String::new();
        }
    }

    let prefix = first_segments[..common].join("/");
    if normalized.iter().all(|p| p.starts_with('/')) {
        format!("/{prefix}")
    } else {
        prefix
    }
}

/// Produces deployment-relative paths from raw input paths.
///
/// Separators are always normalized and leading slashes removed. With
/// `flatten`, the common ancestor of the inputs' directory portions is
/// stripped so files directly inside it become root-relative. Without it
/// the directory structure is preserved untouched (used for build output
/// that is already laid out for deployment).
pub fn optimize_deploy_paths<S: AsRef<str>>(raw_paths: &[S], flatten: bool) -> Vec<String> {
    let normalized: Vec<String> = raw_paths
        .iter()
        .map(|p| normalize_separators(p.as_ref()))
        .collect();

    let ancestor_len = if flatten {
        common_directory_depth(&normalized)
    } else {
        0
    };

    normalized
        .iter()
        .map(|path| {
            split_segments(path)
                .skip(ancestor_len)
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect()
}

/// Number of leading segments shared by the directory portion of every path.
fn common_directory_depth(paths: &[String]) -> usize {
    let dirs: Vec<&str> = paths.iter().map(|p| parent_of(p)).collect();

    // A root-level file means there is nothing to strip.
    if dirs.is_empty() || dirs.iter().any(|d| split_segments(d).next().is_none()) {
        return 0;
    }

    split_segments(&find_common_ancestor(dirs.as_slice())).count()
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}
