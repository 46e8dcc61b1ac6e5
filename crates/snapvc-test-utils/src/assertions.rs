//! Custom assertion helpers for working-tree tests.
//!
//! Failures name the offending path and show both sides, which plain
//! `assert_eq!` on byte vectors does poorly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Assert that a file's bytes equal `expected` exactly.
///
/// # Example
///
/// ```rust
/// use snapvc_test_utils::assertions::assert_file_bytes;
/// use std::fs;
/// use tempfile::TempDir;
///
/// let dir = TempDir::new().unwrap();
/// let path = dir.path().join("blob.bin");
/// fs::write(&path, [0u8, 255]).unwrap();
///
/// assert_file_bytes(&path, &[0, 255]);
/// ```
pub fn assert_file_bytes(path: &Path, expected: &[u8]) {
    let content = std::fs::read(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));

    assert!(
        content == expected,
        "File {} content does not match expected.\nExpected: {:?}\nActual:   {:?}",
        path.display(),
        String::from_utf8_lossy(expected),
        String::from_utf8_lossy(&content)
    );
}

/// Assert that nothing exists at `path`.
pub fn assert_missing(path: &Path) {
    assert!(
        std::fs::symlink_metadata(path).is_err(),
        "Expected {} to be absent, but it exists",
        path.display()
    );
}

/// Assert that two trees hold the same files with the same bytes.
///
/// On failure, lists the paths that are missing, unexpected, or different.
pub fn assert_trees_equal(actual: &BTreeMap<PathBuf, Vec<u8>>, expected: &BTreeMap<PathBuf, Vec<u8>>) {
    if actual == expected {
        return;
    }

    let mut report = String::new();
    for (path, content) in expected {
        match actual.get(path) {
            None => report.push_str(&format!("  missing:    {}\n", path.display())),
            Some(found) if found != content => {
                report.push_str(&format!("  different:  {}\n", path.display()))
            }
            Some(_) => {}
        }
    }
    for path in actual.keys().filter(|p| !expected.contains_key(*p)) {
        report.push_str(&format!("  unexpected: {}\n", path.display()));
    }

    panic!("Trees differ:\n{}", report);
}
