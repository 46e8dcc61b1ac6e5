//! Command handlers for the snapvc CLI.
//!
//! Handlers are split into commands that change state (`snapshot`) and
//! read-only inspection (`inspect`).

pub mod inspect;
pub mod logging;
pub mod snapshot;

pub use inspect::*;
pub use logging::*;
pub use snapshot::*;

use snapvc_snapshot::SnapshotStore;

/// Fail unless `snapvc init` has been run for this tree.
pub(crate) fn ensure_initialized(store: &SnapshotStore) -> anyhow::Result<()> {
    if !store.is_initialized() {
        anyhow::bail!(
            "No snapshot store at {}. Run `snapvc init` first.",
            store.store_dir().display()
        );
    }
    Ok(())
}
