//! Read-only inspection of the store.

use super::ensure_initialized;
use snapvc_snapshot::{SnapshotError, SnapshotStore};

/// Width of abbreviated fingerprints in tabular output.
const SHORT_LEN: usize = 12;

/// List stored snapshots.
pub fn handle_list(store: &SnapshotStore) -> anyhow::Result<()> {
    ensure_initialized(store)?;
    let fingerprints = store.list()?;

    if fingerprints.is_empty() {
        println!("No snapshots found.");
        return Ok(());
    }

    for fingerprint in fingerprints {
        println!("{fingerprint}");
    }
    Ok(())
}

/// Show the files held by one snapshot.
pub fn handle_show(store: &SnapshotStore, fingerprint: &str) -> anyhow::Result<()> {
    ensure_initialized(store)?;
    let record = match store.get(fingerprint) {
        Ok(record) => record,
        Err(SnapshotError::NotFound(_)) => {
            println!("Snapshot not found: {fingerprint}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Snapshot: {}", record.fingerprint());
    println!("Files: {}", record.len());
    println!("Bytes: {}", record.total_bytes());
    if !record.is_empty() {
        println!();
        println!("{:>10}  {}", "SIZE", "PATH");
        println!("{}", "-".repeat(40));
        for (path, content) in record.entries() {
            println!("{:>10}  {}", content.len(), path.display());
        }
    }
    Ok(())
}

/// Report what reverting to a snapshot would change, without changing it.
pub fn handle_status(store: &SnapshotStore, fingerprint: &str) -> anyhow::Result<()> {
    ensure_initialized(store)?;
    let plan = match store.plan_restore(fingerprint) {
        Ok(plan) => plan,
        Err(SnapshotError::NotFound(_)) => {
            println!("Snapshot not found: {fingerprint}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if plan.is_clean() {
        println!(
            "Working tree matches snapshot {}",
            plan.fingerprint.short(SHORT_LEN)
        );
        return Ok(());
    }

    println!("Reverting to {} would:", plan.fingerprint.short(SHORT_LEN));
    for path in &plan.create {
        println!("  create    {}", path.display());
    }
    for path in &plan.overwrite {
        println!("  overwrite {}", path.display());
    }
    for path in &plan.delete {
        println!("  delete    {}", path.display());
    }
    Ok(())
}
