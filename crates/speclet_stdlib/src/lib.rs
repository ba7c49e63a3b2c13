//! Assertion helpers used inside speclet test bodies.
//!
//! Every helper returns `Result<(), Failure>` so a body can chain checks with `?`. Nothing here
//! panics: a failed check is an ordinary value the runner reports.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]

pub mod testing;

// Testing helpers (always available)
pub use speclet_core::failure::{Failure, expect};
pub use testing::{expect_eq, expect_false, expect_ne, expect_true, fail};
