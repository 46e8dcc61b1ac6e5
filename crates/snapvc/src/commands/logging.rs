//! Logging initialization.
//!
//! Logs go to stderr; stdout carries only command output.

use crate::config::Config;

/// Initialize logging from the loaded configuration.
///
/// `RUST_LOG` overrides the configured level; `--verbose` raises it to debug.
pub fn init_logging(config: &Config, verbose: bool) {
    snapvc_util::log::init(config.log_config(verbose));
}
