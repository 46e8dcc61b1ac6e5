//! Shared utilities for snapvc.
//!
//! This crate provides common utilities used across the snapvc workspace:
//! - Logging setup with tracing
//! - Path utilities (ancestor checks, normalization, safe joins)

pub mod log;
pub mod path;

pub use log::{LogConfig, LogLevel};
