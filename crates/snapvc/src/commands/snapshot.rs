//! Handlers for commands that change the store or the working tree.

use super::ensure_initialized;
use anyhow::Context;
use snapvc_snapshot::{SnapshotError, SnapshotStore};
use tracing::debug;

/// Create the store if it does not exist yet.
pub fn handle_init(store: &SnapshotStore) -> anyhow::Result<()> {
    let existed = store.is_initialized();
    store
        .init()
        .with_context(|| format!("Failed to create store at {}", store.store_dir().display()))?;
    debug!(existed, path = %store.store_dir().display(), "Init complete");
    println!("Version control initialized in {}", store.store_dir().display());
    Ok(())
}

/// Capture the working tree and persist it.
pub fn handle_snapshot(store: &SnapshotStore) -> anyhow::Result<()> {
    ensure_initialized(store)?;
    let record = store
        .snapshot()
        .with_context(|| format!("Failed to snapshot {}", store.root().display()))?;
    println!(
        "Snapshot successfully created with identifier {}",
        record.fingerprint()
    );
    Ok(())
}

/// Restore the working tree to a stored snapshot.
///
/// An unknown fingerprint is reported and treated as success.
pub fn handle_revert(store: &SnapshotStore, fingerprint: &str) -> anyhow::Result<()> {
    ensure_initialized(store)?;
    let summary = match store.restore(fingerprint) {
        Ok(summary) => summary,
        Err(SnapshotError::NotFound(_)) => {
            println!("Snapshot not found: {fingerprint}");
            return Ok(());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to revert to {fingerprint}"));
        }
    };

    for path in &summary.deleted {
        println!("File {} has been removed.", path.display());
    }
    println!(
        "Reverted successfully to snapshot {}",
        summary.fingerprint
    );
    Ok(())
}
