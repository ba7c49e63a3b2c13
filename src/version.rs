//! speclet version information.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.

/// The speclet version string (for example, `0.1.0`).
pub const SPECLET_VERSION: &str = env!("CARGO_PKG_VERSION");
