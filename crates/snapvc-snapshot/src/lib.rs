//! Whole-tree snapshots for snapvc.
//!
//! This crate provides:
//! - Capture of every regular file under a working-tree root
//! - A content fingerprint (SHA-256 over file bytes in traversal order)
//! - An append-only store of records, one JSON entry per fingerprint
//! - Restore, which rewrites recorded files and deletes everything else
//!
//! # Example
//!
//! ```no_run
//! use snapvc_snapshot::{SnapshotConfig, SnapshotStore};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SnapshotStore::open("/project/root", &SnapshotConfig::default());
//! store.init()?;
//!
//! let record = store.snapshot()?;
//! println!("created {}", record.fingerprint());
//!
//! // ... edit, add and delete files ...
//!
//! store.restore(record.fingerprint().as_str())?;
//! # Ok(())
//! # }
//! ```

pub mod capture;
mod error;
mod fingerprint;
mod record;
pub mod restore;
mod store;

pub use capture::{capture, scan};
pub use error::{SnapshotError, SnapshotResult};
pub use fingerprint::{Fingerprint, FingerprintHasher, FINGERPRINT_LEN};
pub use record::SnapshotRecord;
pub use restore::{RestorePlan, RestoreSummary};
pub use store::{SnapshotConfig, SnapshotStore, DEFAULT_STORE_DIR, FORMAT_VERSION};
