//! Restoring a working tree to a recorded state.
//!
//! Restore runs in two phases. First every recorded file is written with its
//! recorded bytes. Then the tree is re-scanned and every file the record does
//! not list is deleted. The written set is a subset of the record's paths, so
//! nothing written in the first phase is deleted in the second.
//!
//! A file or symlink standing where a recorded path needs a directory, and a
//! directory or symlink standing at a recorded file path, are removed before
//! the write. Restore never writes through a symlink.
//!
//! The first failing write or delete aborts the restore. Files already
//! written or deleted stay that way; there is no rollback.

use crate::capture::scan;
use crate::{Fingerprint, SnapshotError, SnapshotRecord, SnapshotResult};
use snapvc_util::path::{is_within, safe_join};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What a restore would change, computed without touching the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorePlan {
    pub fingerprint: Fingerprint,
    /// Recorded files missing from the tree.
    pub create: Vec<PathBuf>,
    /// Recorded files whose current bytes differ.
    pub overwrite: Vec<PathBuf>,
    /// Recorded files already matching.
    pub unchanged: Vec<PathBuf>,
    /// Files present now but absent from the record.
    pub delete: Vec<PathBuf>,
}

impl RestorePlan {
    /// Whether the tree already matches the record exactly.
    pub fn is_clean(&self) -> bool {
        self.create.is_empty() && self.overwrite.is_empty() && self.delete.is_empty()
    }
}

/// Outcome of an applied restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreSummary {
    pub fingerprint: Fingerprint,
    /// Every recorded file written, in traversal order.
    pub written: Vec<PathBuf>,
    /// Extraneous files removed, in removal order.
    pub deleted: Vec<PathBuf>,
}

/// Compare the tree under `root` against `record`.
pub fn plan(record: &SnapshotRecord, root: &Path, excluded: &Path) -> SnapshotResult<RestorePlan> {
    let current = scan(root, excluded)?;
    let present: BTreeSet<&Path> = current.iter().map(PathBuf::as_path).collect();

    let mut create = Vec::new();
    let mut overwrite = Vec::new();
    let mut unchanged = Vec::new();
    for (relative, content) in record.entries() {
        if !present.contains(relative) {
            create.push(relative.to_path_buf());
            continue;
        }
        let absolute = root.join(relative);
        let existing = fs::read(&absolute).map_err(|e| SnapshotError::io(&absolute, e))?;
        if existing == content {
            unchanged.push(relative.to_path_buf());
        } else {
            overwrite.push(relative.to_path_buf());
        }
    }

    let delete = current
        .iter()
        .filter(|p| !record.contains(p))
        .cloned()
        .collect();

    Ok(RestorePlan {
        fingerprint: record.fingerprint().clone(),
        create,
        overwrite,
        unchanged,
        delete,
    })
}

/// Bring the tree under `root` to exactly the state in `record`.
pub fn apply(
    record: &SnapshotRecord,
    root: &Path,
    excluded: &Path,
) -> SnapshotResult<RestoreSummary> {
    let mut written = Vec::with_capacity(record.len());
    let mut deleted = Vec::new();
    for (relative, content) in record.entries() {
        let absolute = safe_join(root, relative).ok_or_else(|| {
            SnapshotError::corrupted(format!(
                "record {} contains unsafe path {}",
                record.fingerprint(),
                relative.display()
            ))
        })?;
        if is_within(&absolute, excluded) || is_within(excluded, &absolute) {
            warn!(path = %relative.display(), "Skipping recorded file that overlaps the store");
            continue;
        }
        clear_path(root, relative, excluded, &mut deleted)?;
        fs::write(&absolute, content).map_err(|e| SnapshotError::io(&absolute, e))?;
        debug!(path = %relative.display(), bytes = content.len(), "Restored file");
        written.push(relative.to_path_buf());
    }

    for relative in scan(root, excluded)? {
        if record.contains(&relative) {
            continue;
        }
        let absolute = root.join(&relative);
        fs::remove_file(&absolute).map_err(|e| SnapshotError::io(&absolute, e))?;
        debug!(path = %relative.display(), "Removed extraneous file");
        deleted.push(relative);
    }

    info!(
        fingerprint = %record.fingerprint(),
        written = written.len(),
        deleted = deleted.len(),
        "Restored working tree"
    );

    Ok(RestoreSummary {
        fingerprint: record.fingerprint().clone(),
        written,
        deleted,
    })
}

/// Make `root/relative` ready to be written as a regular file.
///
/// Every ancestor becomes a real directory and the leaf is left either vacant
/// or a regular file. Anything in the way cannot be a recorded path: a symlink
/// or file on the ancestor chain, a symlink at the leaf, or a directory at the
/// leaf. Those are removed, and removed regular files are appended to
/// `removed`.
fn clear_path(
    root: &Path,
    relative: &Path,
    excluded: &Path,
    removed: &mut Vec<PathBuf>,
) -> SnapshotResult<()> {
    let mut current = root.to_path_buf();
    let mut so_far = PathBuf::new();
    let mut components = relative.components().peekable();

    while let Some(component) = components.next() {
        current.push(component);
        so_far.push(component);
        let is_leaf = components.peek().is_none();

        let meta = match fs::symlink_metadata(&current) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if !is_leaf {
                    fs::create_dir(&current).map_err(|e| SnapshotError::io(&current, e))?;
                }
                continue;
            }
            Err(e) => return Err(SnapshotError::io(&current, e)),
        };
        let file_type = meta.file_type();

        if is_leaf {
            if file_type.is_symlink() {
                fs::remove_file(&current).map_err(|e| SnapshotError::io(&current, e))?;
                debug!(path = %so_far.display(), "Replaced symlink at recorded path");
            } else if file_type.is_dir() {
                for inner in scan(&current, excluded)? {
                    removed.push(so_far.join(inner));
                }
                fs::remove_dir_all(&current).map_err(|e| SnapshotError::io(&current, e))?;
                debug!(path = %so_far.display(), "Replaced directory at recorded path");
            }
            continue;
        }

        if file_type.is_dir() {
            continue;
        }
        if is_within(excluded, &current) {
            return Err(SnapshotError::io(
                &current,
                io::Error::other("the store lies beneath a path that restore must replace"),
            ));
        }
        fs::remove_file(&current).map_err(|e| SnapshotError::io(&current, e))?;
        if file_type.is_file() {
            removed.push(so_far.clone());
        }
        debug!(path = %so_far.display(), "Replaced non-directory on a recorded parent path");
        fs::create_dir(&current).map_err(|e| SnapshotError::io(&current, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::capture;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join(".snapvc");
        fs::create_dir_all(&store).unwrap();
        (dir, store)
    }

    fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn apply_rewrites_and_deletes() {
        let (dir, store) = setup();
        let root = dir.path();
        write(root, "keep.txt", b"original");
        write(root, "nested/data.bin", &[1, 2, 3]);
        let record = capture(root, &store).unwrap();

        write(root, "keep.txt", b"modified");
        fs::remove_file(root.join("nested/data.bin")).unwrap();
        write(root, "extra.txt", b"new");
        write(root, "new-dir/extra2.txt", b"new");

        let summary = apply(&record, root, &store).unwrap();

        assert_eq!(fs::read(root.join("keep.txt")).unwrap(), b"original");
        assert_eq!(fs::read(root.join("nested/data.bin")).unwrap(), vec![1, 2, 3]);
        assert!(!root.join("extra.txt").exists());
        assert!(!root.join("new-dir/extra2.txt").exists());
        assert_eq!(summary.written.len(), 2);
        assert_eq!(
            summary.deleted,
            vec![PathBuf::from("extra.txt"), PathBuf::from("new-dir/extra2.txt")]
        );
    }

    #[test]
    fn apply_never_touches_the_store() {
        let (dir, store) = setup();
        let root = dir.path();
        write(root, "a.txt", b"a");
        let record = capture(root, &store).unwrap();
        fs::write(store.join("entry.json"), b"{}").unwrap();

        let summary = apply(&record, root, &store).unwrap();

        assert!(summary.deleted.is_empty());
        assert!(store.join("entry.json").exists());
    }

    #[test]
    fn plan_classifies_without_mutating() {
        let (dir, store) = setup();
        let root = dir.path();
        write(root, "same.txt", b"same");
        write(root, "changed.txt", b"before");
        write(root, "gone.txt", b"gone");
        let record = capture(root, &store).unwrap();

        write(root, "changed.txt", b"after");
        fs::remove_file(root.join("gone.txt")).unwrap();
        write(root, "added.txt", b"added");

        let plan = plan(&record, root, &store).unwrap();

        assert_eq!(plan.create, vec![PathBuf::from("gone.txt")]);
        assert_eq!(plan.overwrite, vec![PathBuf::from("changed.txt")]);
        assert_eq!(plan.unchanged, vec![PathBuf::from("same.txt")]);
        assert_eq!(plan.delete, vec![PathBuf::from("added.txt")]);
        assert!(!plan.is_clean());

        assert_eq!(fs::read(root.join("changed.txt")).unwrap(), b"after");
        assert!(root.join("added.txt").exists());
    }

    #[test]
    fn plan_after_apply_is_clean() {
        let (dir, store) = setup();
        let root = dir.path();
        write(root, "a.txt", b"a");
        let record = capture(root, &store).unwrap();
        write(root, "a.txt", b"b");
        write(root, "b.txt", b"b");

        apply(&record, root, &store).unwrap();

        assert!(plan(&record, root, &store).unwrap().is_clean());
    }

    #[cfg(unix)]
    #[test]
    fn apply_replaces_symlink_instead_of_writing_through() {
        let (dir, store) = setup();
        let root = dir.path();
        write(root, "a.txt", b"recorded");
        let record = capture(root, &store).unwrap();

        let outside = TempDir::new().unwrap();
        let target = outside.path().join("target.txt");
        fs::write(&target, b"outside").unwrap();
        fs::remove_file(root.join("a.txt")).unwrap();
        std::os::unix::fs::symlink(&target, root.join("a.txt")).unwrap();

        apply(&record, root, &store).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"outside");
        let meta = fs::symlink_metadata(root.join("a.txt")).unwrap();
        assert!(meta.file_type().is_file());
        assert_eq!(fs::read(root.join("a.txt")).unwrap(), b"recorded");
    }

    #[cfg(unix)]
    #[test]
    fn apply_does_not_write_through_symlinked_parent() {
        let (dir, store) = setup();
        let root = dir.path();
        write(root, "a/b.txt", b"recorded");
        let record = capture(root, &store).unwrap();

        let outside = TempDir::new().unwrap();
        fs::remove_dir_all(root.join("a")).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("a")).unwrap();

        apply(&record, root, &store).unwrap();

        assert!(!outside.path().join("b.txt").exists());
        let meta = fs::symlink_metadata(root.join("a")).unwrap();
        assert!(meta.file_type().is_dir());
        assert_eq!(fs::read(root.join("a/b.txt")).unwrap(), b"recorded");
        assert!(plan(&record, root, &store).unwrap().is_clean());
    }

    #[test]
    fn apply_replaces_file_standing_where_directory_was() {
        let (dir, store) = setup();
        let root = dir.path();
        write(root, "a/b.txt", b"nested");
        let record = capture(root, &store).unwrap();

        fs::remove_dir_all(root.join("a")).unwrap();
        write(root, "a", b"now a file");

        let summary = apply(&record, root, &store).unwrap();

        assert!(root.join("a").is_dir());
        assert_eq!(fs::read(root.join("a/b.txt")).unwrap(), b"nested");
        assert_eq!(summary.deleted, vec![PathBuf::from("a")]);
        assert!(plan(&record, root, &store).unwrap().is_clean());
    }

    #[test]
    fn apply_replaces_directory_standing_where_file_was() {
        let (dir, store) = setup();
        let root = dir.path();
        write(root, "a", b"flat");
        let record = capture(root, &store).unwrap();

        fs::remove_file(root.join("a")).unwrap();
        write(root, "a/new.txt", b"new");
        write(root, "a/deeper/more.txt", b"more");

        let summary = apply(&record, root, &store).unwrap();

        assert!(root.join("a").is_file());
        assert_eq!(fs::read(root.join("a")).unwrap(), b"flat");
        assert_eq!(
            summary.deleted,
            vec![PathBuf::from("a/deeper/more.txt"), PathBuf::from("a/new.txt")]
        );
        assert!(plan(&record, root, &store).unwrap().is_clean());
    }
}
