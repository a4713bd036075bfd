//! Tracing and logging setup shared by binaries.

/// Initialize process-wide logging from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
/// An invalid configuration falls back to the defaults and is reported once
/// the subscriber is installed.
pub fn init() {
    match LogConfig::from_env() {
        Ok(config) => {
            tracing::init_with(&config);
        }
        Err(err) => {
            tracing::init_with(&LogConfig::default());
            ::tracing::warn!(error = %err, "invalid logging configuration; using defaults");
        }
    }
}

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use tracing::{LogConfig, LogConfigError, LogFormat};
