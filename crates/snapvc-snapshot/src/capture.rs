//! Tree traversal and capture.
//!
//! The traversal order is depth-first with siblings sorted by file name,
//! which is the same as sorting relative paths component by component.
//! The fingerprint depends on this order, so it must never follow the
//! filesystem's own enumeration order.

use crate::{FingerprintHasher, SnapshotError, SnapshotRecord, SnapshotResult};
use snapvc_util::path::{is_within, relative_to};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// List the regular files under `root`, relative to `root`, in traversal order.
///
/// Anything at or below `excluded` is skipped, as are symlinks and other
/// non-regular files. A missing `root` yields an empty list; any walk error
/// is returned rather than skipped.
pub fn scan(root: &Path, excluded: &Path) -> SnapshotResult<Vec<PathBuf>> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(SnapshotError::io(
                root,
                io::Error::other("working tree root is not a directory"),
            ))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(root = %root.display(), "Working tree root does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(SnapshotError::io(root, e)),
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_within(entry.path(), excluded));

    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(relative) = relative_to(entry.path(), root) {
            paths.push(relative);
        }
    }

    Ok(paths)
}

/// Capture every file under `root` except the store at `excluded`.
///
/// Contents are read as raw bytes and hashed in traversal order. A file that
/// vanishes or cannot be read between discovery and read fails the capture.
pub fn capture(root: &Path, excluded: &Path) -> SnapshotResult<SnapshotRecord> {
    let paths = scan(root, excluded)?;

    let mut hasher = FingerprintHasher::new();
    let mut files = BTreeMap::new();
    for relative in &paths {
        let absolute = root.join(relative);
        let content = fs::read(&absolute).map_err(|e| SnapshotError::io(&absolute, e))?;
        hasher.update(&content);
        debug!(path = %relative.display(), bytes = content.len(), "Captured file");
        files.insert(relative.clone(), content);
    }

    let record = SnapshotRecord::new(hasher.finish(), paths, files);
    info!(
        fingerprint = %record.fingerprint(),
        files = record.len(),
        bytes = record.total_bytes(),
        "Captured working tree"
    );

    Ok(record)
}

fn walk_error(root: &Path, err: walkdir::Error) -> SnapshotError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other(message));
    SnapshotError::Io { path, source }
}
