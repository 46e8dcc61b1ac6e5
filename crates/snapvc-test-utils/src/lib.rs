//! Testing utilities and fixtures for snapvc.
//!
//! - **Fixtures**: temporary working trees built from a file list
//! - **Assertions**: file and tree comparisons with readable failures
//!
//! # Example Usage
//!
//! ```rust
//! use snapvc_test_utils::TestProject;
//!
//! let project = TestProject::new()
//!     .with_file("src/main.rs", "fn main() {}")
//!     .with_file("assets/logo.bin", vec![0u8, 159, 146, 150])
//!     .build();
//!
//! assert!(project.path().join("assets/logo.bin").exists());
//! ```

pub mod assertions;
pub mod fixtures;

pub use fixtures::{BuiltTestProject, TestProject};
