//! The declaration model of speclet: suites, test cases, fixtures and their metadata.
//!
//! Declarations are compiled into a tree of [`Suite`]s (deferred sequences) and [`TestCase`]s. Every
//! node carries one merged [`Metadata`] record. Fixture bindings are attached to the tree by the
//! context injector, either per test case or once per sequence activation.
//!
//! ## Notes
//!
//! - This is a "semantic core" crate: **no IO**, no global state. Running the tree and reporting
//!   results is the job of the `speclet` crate.
//! - Test bodies receive an explicit [`Context`] and signal failure by returning [`Failure`].
//! - Declaration mistakes are [`DeclError`]s, raised when a declaration is built or realized.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]

pub mod args;
pub mod bindings;
pub mod context;
pub mod decl;
pub mod errors;
pub mod failure;
pub mod inject;
pub mod metadata;
pub mod registry;
pub mod tree;

pub use args::{Arg, DeclArgs, Expr, Outcome, Slots, Stmt};
pub use bindings::{BindingItem, Bindings};
pub use context::{Context, ContextEntry, Fixture, FixtureValue, Lifecycle};
pub use decl::{describe, do_it, given, it, testing, using, using_once};
pub use errors::DeclError;
pub use failure::{Failure, Truthy, expect};
pub use inject::inject;
pub use metadata::{Attributes, DeclSite, Metadata, Symbol, join_doc, sym};
pub use registry::{Registration, Registry, SuiteName};
pub use tree::{Node, Suite, TestCase, TestSequence};
