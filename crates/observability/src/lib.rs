//! Tracing and logging setup shared by the stockroom binaries.

/// Initialize process-wide logging with the default `info` filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("info");
}

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::LogFormat;
