//! Canonical paths inside the archive.
//!
//! Callers hand us paths in whatever shape they like (`/a/b`, `a//b/`, `//`),
//! and archives store names in their own shapes (`a/b`, `./a/b`, `a/`).
//! Everything is looked up by one canonical form instead:
//! slash-separated, relative, with no empty, `.`, or `..` segments.
//! The root directory is the empty path.

use camino::{Utf8Path, Utf8PathBuf};

/// Normalizes any string into a canonical archive path.
///
/// Repeated, leading, and trailing slashes collapse away, `.` segments are dropped,
/// and `..` pops the previous segment (stopping at the root, like `/..` does).
/// This never fails, and normalizing a canonical path returns it unchanged.
///
/// ```
/// # use zipfs::path::normalize;
/// assert_eq!(normalize("//bar//baz/"), "bar/baz");
/// assert_eq!(normalize("/"), "");
/// assert_eq!(normalize("a/./b/../c"), "a/c");
/// ```
pub fn normalize(path: &str) -> Utf8PathBuf {
    let mut kept: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                kept.pop();
            }
            s => kept.push(s),
        }
    }
    Utf8PathBuf::from(kept.join("/"))
}

/// Iterates over the segments of a canonical path. The root has none.
pub fn segments(canonical: &Utf8Path) -> impl Iterator<Item = &str> {
    canonical.as_str().split('/').filter(|s| !s.is_empty())
}

/// Returns true if `path` tries to climb out of wherever it's rooted.
///
/// Archive entry names like this are a classic attack ("zip slip"),
/// so we refuse them instead of quietly normalizing them away.
pub(crate) fn has_parent_segment(path: &str) -> bool {
    path.split('/').any(|s| s == "..")
}

/// The last segment of a canonical path, or `""` for the root.
pub fn base_name(canonical: &Utf8Path) -> &str {
    canonical.file_name().unwrap_or("")
}
