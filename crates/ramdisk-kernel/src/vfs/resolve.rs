//! Path resolution against the namespace table.
//!
//! Paths are absolute, slash-separated strings. Resolution walks from the
//! root one segment at a time, scanning the whole table for a child of the
//! current directory with a byte-exact matching name. There is no index
//! structure; each step is O(capacity).

use tracing::debug;

use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::table::{NamespaceTable, ROOT_INDEX, SlotIndex};

/// Collapse repeated slashes and strip any trailing slash.
///
/// The root stays `/`. Relative paths are rejected.
pub fn normalize(path: &str) -> VfsResult<String> {
    if !path.starts_with('/') {
        return Err(VfsError::invalid_path(path));
    }
    let mut normalized = String::with_capacity(path.len());
    for segment in segments(path) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    Ok(normalized)
}

/// Non-empty segments of a path, in order.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Resolve an absolute path to a slot index.
pub fn resolve(table: &NamespaceTable, path: &str) -> VfsResult<SlotIndex> {
    debug!(path, "resolve");
    if !path.starts_with('/') {
        return Err(VfsError::invalid_path(path));
    }

    let mut current = ROOT_INDEX;
    for segment in segments(path) {
        match table.find_child(current, segment) {
            Some(index) => {
                debug!(segment, index, "resolve: step");
                current = index;
            }
            None => {
                debug!(path, segment, "resolve: not found");
                return Err(VfsError::not_found(path));
            }
        }
    }

    debug!(path, index = current, "resolve: done");
    Ok(current)
}

/// Split a path into its parent's slot index and the final segment.
///
/// The parent must exist and be a directory. Only then is the final
/// segment validated as a new entry name: it must be non-empty, not `.` or
/// `..`, and at most `max_name_len` bytes.
pub fn split_parent(
    table: &NamespaceTable,
    path: &str,
    max_name_len: usize,
) -> VfsResult<(SlotIndex, String)> {
    debug!(path, "split_parent");
    let normalized = normalize(path)?;
    let Some((prefix, name)) = normalized.rsplit_once('/') else {
        return Err(VfsError::invalid_path(path));
    };
    let parent_path = if prefix.is_empty() { "/" } else { prefix };

    let parent = resolve(table, parent_path)?;
    match table.get(parent) {
        Some(entry) if entry.is_dir() => {}
        Some(_) => return Err(VfsError::not_a_directory(path)),
        None => {
            return Err(VfsError::internal(format!(
                "{parent_path} resolved to free slot {parent}"
            )));
        }
    }
    validate_name(name, max_name_len)?;

    let mut child = String::new();
    child
        .try_reserve_exact(name.len())
        .map_err(|e| VfsError::OutOfMemory(format!("{path}: {e}")))?;
    child.push_str(name);

    debug!(path, parent, child = %child, "split_parent: done");
    Ok((parent, child))
}

/// Check a single entry name against the table's bounds.
pub fn validate_name(name: &str, max_name_len: usize) -> VfsResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(VfsError::invalid_path(name));
    }
    if name.len() > max_name_len {
        return Err(VfsError::name_too_long(name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::table::{Entry, MAX_NAME_LEN};

    /// `/docs` (1), `/docs/a.txt` (2), `/b` (3).
    fn sample_table() -> NamespaceTable {
        let mut table = NamespaceTable::default();
        let docs = table
            .allocate(Entry::directory("docs", ROOT_INDEX, 0o755))
            .unwrap();
        table.allocate(Entry::file("a.txt", docs, 0o644)).unwrap();
        table.allocate(Entry::file("b", ROOT_INDEX, 0o644)).unwrap();
        table
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/").unwrap(), "/");
        assert_eq!(normalize("//").unwrap(), "/");
        assert_eq!(normalize("/a/").unwrap(), "/a");
        assert_eq!(normalize("/a//b///").unwrap(), "/a/b");
        assert!(matches!(normalize("a/b"), Err(VfsError::InvalidPath(_))));
        assert!(matches!(normalize(""), Err(VfsError::InvalidPath(_))));
    }

    #[test]
    fn test_resolve_root() {
        let table = sample_table();
        assert_eq!(resolve(&table, "/").unwrap(), ROOT_INDEX);
        assert_eq!(resolve(&table, "///").unwrap(), ROOT_INDEX);
    }

    #[test]
    fn test_resolve_nested() {
        let table = sample_table();
        assert_eq!(resolve(&table, "/docs").unwrap(), 1);
        assert_eq!(resolve(&table, "/docs/a.txt").unwrap(), 2);
        assert_eq!(resolve(&table, "/docs//a.txt/").unwrap(), 2);
        assert_eq!(resolve(&table, "/b").unwrap(), 3);
    }

    #[test]
    fn test_resolve_not_found() {
        let table = sample_table();
        assert!(resolve(&table, "/missing").unwrap_err().is_not_found());
        assert!(resolve(&table, "/docs/missing").unwrap_err().is_not_found());
        // Names are case-sensitive and only match under their own parent.
        assert!(resolve(&table, "/DOCS").unwrap_err().is_not_found());
        assert!(resolve(&table, "/a.txt").unwrap_err().is_not_found());
        // A file has no children.
        assert!(resolve(&table, "/b/x").unwrap_err().is_not_found());
        // Dot segments are plain names.
        assert!(resolve(&table, "/docs/..").unwrap_err().is_not_found());
    }

    #[test]
    fn test_resolve_rejects_relative() {
        let table = sample_table();
        assert!(matches!(
            resolve(&table, "docs"),
            Err(VfsError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_split_parent() {
        let table = sample_table();
        assert_eq!(
            split_parent(&table, "/new", MAX_NAME_LEN).unwrap(),
            (ROOT_INDEX, "new".to_string())
        );
        assert_eq!(
            split_parent(&table, "/docs/new/", MAX_NAME_LEN).unwrap(),
            (1, "new".to_string())
        );
    }

    #[test]
    fn test_split_parent_missing_parent() {
        let table = sample_table();
        let err = split_parent(&table, "/nope/new", MAX_NAME_LEN).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_split_parent_no_separator() {
        let table = sample_table();
        assert!(matches!(
            split_parent(&table, "new", MAX_NAME_LEN),
            Err(VfsError::InvalidPath(_))
        ));
        assert!(matches!(
            split_parent(&table, "/", MAX_NAME_LEN),
            Err(VfsError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_split_parent_name_bounds() {
        let table = sample_table();
        let longest = "n".repeat(MAX_NAME_LEN);
        assert!(split_parent(&table, &format!("/{longest}"), MAX_NAME_LEN).is_ok());

        let too_long = "n".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            split_parent(&table, &format!("/{too_long}"), MAX_NAME_LEN),
            Err(VfsError::NameTooLong(_))
        ));
        assert!(matches!(
            split_parent(&table, "/docs/..", MAX_NAME_LEN),
            Err(VfsError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_split_parent_file_parent_before_name_bounds() {
        let table = sample_table();
        let too_long = "n".repeat(MAX_NAME_LEN + 1);
        for path in ["/b/new".to_string(), format!("/b/{too_long}"), "/b/..".to_string()] {
            assert!(matches!(
                split_parent(&table, &path, MAX_NAME_LEN),
                Err(VfsError::NotADirectory(_))
            ));
        }
    }
}
