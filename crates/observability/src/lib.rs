//! Process-wide logging setup shared by the storefront binaries.

/// Initialize tracing from the environment.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&tracing::LogOptions::from_env());
}

/// Subscriber configuration (filters, output format).
pub mod tracing;
