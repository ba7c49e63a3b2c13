//! Fixture values and the explicit execution context handed to test bodies.
//!
//! Fixture values are looked up by name from a [`Context`]. Names bound later shadow names bound
//! earlier, which is how an inner `using` shadows an outer one.

use core::any::{Any, type_name};
use core::fmt;
use std::sync::Arc;

use crate::failure::Failure;
use crate::metadata::Symbol;

/// A type-erased fixture value.
pub type FixtureValue = Arc<dyn Any + Send + Sync>;

type FixtureFn = dyn Fn(&Context) -> Result<FixtureValue, Failure> + Send + Sync;

/// A fixture expression: produces a value from the bindings visible so far.
#[derive(Clone)]
pub struct Fixture {
    eval: Arc<FixtureFn>,
}

impl Fixture {
    /// Build a fixture from an expression over the current context.
    pub fn new<T, F>(expr: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Context) -> Result<T, Failure> + Send + Sync + 'static,
    {
        Self {
            eval: Arc::new(move |ctx: &Context| expr(ctx).map(|value| Arc::new(value) as FixtureValue)),
        }
    }

    /// A fixture that always yields the same shared value.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        let shared: FixtureValue = Arc::new(value);
        Self {
            eval: Arc::new(move |_: &Context| -> Result<FixtureValue, Failure> { Ok(Arc::clone(&shared)) }),
        }
    }

    pub fn evaluate(&self, ctx: &Context) -> Result<FixtureValue, Failure> {
        (self.eval)(ctx)
    }
}

impl fmt::Debug for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Fixture(..)")
    }
}

/// When a fixture expression is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Freshly for every test case that sees the binding.
    #[default]
    PerTest,
    /// Once per activation of the sequence carrying the binding, shared by all descendants.
    Once,
}

/// "This fixture is available under this name during execution."
#[derive(Debug, Clone)]
pub struct ContextEntry {
    name: Symbol,
    fixture: Fixture,
    lifecycle: Lifecycle,
}

impl ContextEntry {
    pub fn new(name: Symbol, fixture: Fixture, lifecycle: Lifecycle) -> Self {
        Self {
            name,
            fixture,
            lifecycle,
        }
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Same binding, different lifecycle.
    pub fn with_lifecycle(&self, lifecycle: Lifecycle) -> Self {
        Self {
            lifecycle,
            ..self.clone()
        }
    }
}

/// Fixture values visible to a test body, in binding order.
#[derive(Clone, Default)]
pub struct Context {
    values: Vec<(Symbol, FixtureValue)>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: Symbol, value: FixtureValue) {
        self.values.push((name, value));
    }

    /// Evaluate `entries` in order, each one seeing the values bound before it.
    ///
    /// ## Errors
    /// - [`Failure::Fixture`] naming the first entry whose expression failed.
    pub fn bind_entries(&mut self, entries: &[ContextEntry]) -> Result<(), Failure> {
        for entry in entries {
            let value = entry
                .fixture()
                .evaluate(self)
                .map_err(|cause| Failure::fixture(entry.name().as_str(), cause))?;
            tracing::trace!(fixture = %entry.name(), "bound fixture");
            self.bind(entry.name().clone(), value);
        }
        Ok(())
    }

    /// The most recently bound value for `name`.
    pub fn lookup(&self, name: &str) -> Option<&FixtureValue> {
        self.values.iter().rev().find(|(n, _)| n.as_str() == name).map(|(_, v)| v)
    }

    /// Typed access to a fixture value.
    ///
    /// ## Errors
    /// - [`Failure::MissingContext`] if nothing is bound under `name`.
    /// - [`Failure::ContextType`] if the value is not a `T`.
    pub fn get<T: Any>(&self, name: &str) -> Result<&T, Failure> {
        let value = self
            .lookup(name)
            .ok_or_else(|| Failure::MissingContext(name.to_string()))?;
        (**value).downcast_ref::<T>().ok_or_else(|| Failure::ContextType {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Bound names in binding order, shadowed ones included.
    pub fn names(&self) -> impl Iterator<Item = &Symbol> {
        self.values.iter().map(|(n, _)| n)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_bindings_shadow_earlier_ones() {
        let mut ctx = Context::new();
        ctx.bind(Symbol::new("x"), Arc::new(1_i64));
        ctx.bind(Symbol::new("x"), Arc::new(2_i64));

        assert_eq!(*ctx.get::<i64>("x").unwrap(), 2);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_typed_lookup_errors() {
        let mut ctx = Context::new();
        ctx.bind(Symbol::new("name"), Arc::new(String::from("ada")));

        assert_eq!(ctx.get::<i64>("missing"), Err(Failure::MissingContext("missing".into())));
        assert!(matches!(ctx.get::<i64>("name"), Err(Failure::ContextType { .. })));
        assert_eq!(ctx.get::<String>("name").unwrap(), "ada");
    }

    #[test]
    fn test_bind_entries_is_sequential() {
        let entries = vec![
            ContextEntry::new(Symbol::new("x"), Fixture::value(20_i64), Lifecycle::PerTest),
            ContextEntry::new(
                Symbol::new("y"),
                Fixture::new(|ctx| Ok(ctx.get::<i64>("x")? + 1)),
                Lifecycle::PerTest,
            ),
        ];

        let mut ctx = Context::new();
        ctx.bind_entries(&entries).unwrap();
        assert_eq!(*ctx.get::<i64>("y").unwrap(), 21);
    }

    #[test]
    fn test_bind_entries_wraps_the_failing_fixture() {
        let entries = vec![ContextEntry::new(
            Symbol::new("y"),
            Fixture::new(|ctx| Ok(*ctx.get::<i64>("nope")?)),
            Lifecycle::Once,
        )];

        let err = Context::new().bind_entries(&entries).unwrap_err();
        assert_eq!(
            err,
            Failure::fixture("y", Failure::MissingContext("nope".into()))
        );
    }
}
