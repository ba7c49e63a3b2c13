//! The suite tree: deferred suites, flattened sequences and test cases.
//!
//! ## Notes
//!
//! - A [`Suite`] is only a thunk. Its children are produced when [`Suite::realize`] is called,
//!   and realizing twice must be safe (runners re-run suites).
//! - Nodes are value-like. Context injection builds new nodes instead of mutating existing ones.

use core::fmt;
use std::sync::Arc;

use crate::context::{Context, ContextEntry};
use crate::errors::DeclError;
use crate::failure::Failure;
use crate::metadata::Metadata;

type Realize = dyn Fn() -> Result<TestSequence, DeclError> + Send + Sync;

type Body = dyn Fn(&Context) -> Result<(), Failure> + Send + Sync;

/// A lazily evaluated producer of a [`TestSequence`].
#[derive(Clone)]
pub struct Suite {
    thunk: Arc<Realize>,
}

impl Suite {
    pub fn deferred<F>(thunk: F) -> Self
    where
        F: Fn() -> Result<TestSequence, DeclError> + Send + Sync + 'static,
    {
        Self { thunk: Arc::new(thunk) }
    }

    /// A suite whose sequence was already built.
    pub fn from_sequence(sequence: TestSequence) -> Self {
        Self::deferred(move || Ok(sequence.clone()))
    }

    /// Evaluate the thunk.
    pub fn realize(&self) -> Result<TestSequence, DeclError> {
        (self.thunk)()
    }

    /// Defer `f` until this suite is realized.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(TestSequence) -> TestSequence + Send + Sync + 'static,
    {
        let inner = self.clone();
        Self::deferred(move || inner.realize().map(&f))
    }
}

impl fmt::Debug for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Suite(<deferred>)")
    }
}

/// A single executable unit with its metadata and per-test context.
#[derive(Clone)]
pub struct TestCase {
    meta: Metadata,
    body: Arc<Body>,
    context: Vec<ContextEntry>,
}

impl TestCase {
    pub fn new<F>(meta: Metadata, body: F) -> Self
    where
        F: Fn(&Context) -> Result<(), Failure> + Send + Sync + 'static,
    {
        Self {
            meta,
            body: Arc::new(body),
            context: Vec::new(),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    /// Per-test fixtures, outermost first.
    pub fn context(&self) -> &[ContextEntry] {
        &self.context
    }

    /// Run the body. A returned failure must reach the caller unchanged.
    pub fn run(&self, ctx: &Context) -> Result<(), Failure> {
        (self.body)(ctx)
    }

    pub(crate) fn with_outer_context(&self, entries: &[ContextEntry]) -> Self {
        let mut context = entries.to_vec();
        context.extend(self.context.iter().cloned());
        Self {
            context,
            ..self.clone()
        }
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("meta", &self.meta)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// A child of a [`TestSequence`].
#[derive(Debug, Clone)]
pub enum Node {
    Suite(Suite),
    Case(TestCase),
}

impl From<Suite> for Node {
    fn from(suite: Suite) -> Self {
        Node::Suite(suite)
    }
}

impl From<TestCase> for Node {
    fn from(case: TestCase) -> Self {
        Node::Case(case)
    }
}

/// An ordered, flattened list of children plus the metadata of the sequence as a whole.
#[derive(Debug, Clone)]
pub struct TestSequence {
    meta: Metadata,
    children: Vec<Node>,
    context: Vec<ContextEntry>,
}

impl TestSequence {
    pub fn new(meta: Metadata, children: Vec<Node>) -> Self {
        Self {
            meta,
            children,
            context: Vec::new(),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Sequence-level fixtures, outermost first.
    ///
    /// `Once` entries are evaluated once per activation of this sequence. `PerTest` entries are
    /// re-evaluated for every descendant test case.
    pub fn context(&self) -> &[ContextEntry] {
        &self.context
    }

    /// Direct test-case children.
    pub fn test_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.children.iter().filter_map(|node| match node {
            Node::Case(case) => Some(case),
            Node::Suite(_) => None,
        })
    }

    /// Count every test case below this sequence, realizing nested suites.
    pub fn count_cases(&self) -> Result<usize, DeclError> {
        let mut count = 0;
        for node in &self.children {
            count += match node {
                Node::Case(_) => 1,
                Node::Suite(suite) => suite.realize()?.count_cases()?,
            };
        }
        Ok(count)
    }

    pub(crate) fn with_outer_context(mut self, entries: &[ContextEntry]) -> Self {
        let mut context = entries.to_vec();
        context.append(&mut self.context);
        self.context = context;
        self
    }

    pub(crate) fn map_children<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Vec<Node>) -> Vec<Node>,
    {
        let children = std::mem::take(&mut self.children);
        self.children = f(children);
        self
    }
}
