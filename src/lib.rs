#![forbid(unsafe_code)]
//! speclet: declarative test suites with fixtures, metadata and a pytest-style runner.
//!
//! Suites are declared with the macros of this crate (`describe!`, `testing!`, `it!`, `do_it!`,
//! `using!`, `using_once!`, `given!`) and compiled into a tree by `speclet_core`. A `harness = false`
//! test target then hands its [`Registry`] to [`cli::run`].
//!
//! ```rust,no_run
//! use speclet::{Registry, describe, expr, it};
//!
//! fn main() {
//!     let mut registry = Registry::new();
//!     describe!(&mut registry, "arithmetic", it!("adds", expr!(1 + 1 == 2)));
//!     speclet::cli::run(&registry);
//! }
//! ```
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Test bodies**: A panic inside a test body is caught by the executor and reported as a failure.

pub mod cli;
mod macros;
pub mod version;

pub use speclet_core::{
    Arg, Attributes, BindingItem, Bindings, Context, ContextEntry, DeclError, DeclSite, Expr, Failure, Fixture,
    FixtureValue, Lifecycle, Metadata, Node, Outcome, Registration, Registry, Stmt, Suite, SuiteName, Symbol,
    TestCase, TestSequence, Truthy, describe, do_it, given, it, join_doc, sym, testing, using, using_once,
};
pub use speclet_stdlib::{expect, expect_eq, expect_false, expect_ne, expect_true, fail};

pub use cli::reporters::{ConsoleReporter, JsonReporter, TestReporter};
pub use cli::test_runner::{OutputFormat, RunConfig, TestInfo, TestResult, TestSummary, list_tests, run_registry, run_with};
