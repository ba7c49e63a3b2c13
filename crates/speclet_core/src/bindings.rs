//! Fixture binding lists.
//!
//! A binding list is an ordered sequence of (name, expression) pairs. Expressions are evaluated
//! in declaration order and each one sees the names bound before it. Lists are validated when they
//! are built, so a malformed list is reported at declaration time.

use crate::context::{Context, ContextEntry, Fixture, Lifecycle};
use crate::errors::DeclError;
use crate::failure::Failure;
use crate::metadata::Symbol;

/// One slot of an alternating `name, expression, name, expression, ...` list.
#[derive(Debug, Clone)]
pub enum BindingItem {
    Name(Symbol),
    Expr(Fixture),
}

impl From<&str> for BindingItem {
    fn from(name: &str) -> Self {
        BindingItem::Name(Symbol::new(name))
    }
}

impl From<Symbol> for BindingItem {
    fn from(name: Symbol) -> Self {
        BindingItem::Name(name)
    }
}

impl From<Fixture> for BindingItem {
    fn from(fixture: Fixture) -> Self {
        BindingItem::Expr(fixture)
    }
}

/// A validated binding list.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    pairs: Vec<(Symbol, Fixture)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an alternating list; names sit in the even slots (0, 2, 4, ...).
    ///
    /// ## Errors
    /// - [`DeclError::OddBindings`] for an odd-length list.
    /// - [`DeclError::BindingName`] / [`DeclError::BindingExpr`] for a slot of the wrong kind.
    /// - [`DeclError::DuplicateBinding`] when a name repeats.
    pub fn try_from_flat(items: Vec<BindingItem>) -> Result<Self, DeclError> {
        let len = items.len();
        if len % 2 != 0 {
            return Err(DeclError::OddBindings { len });
        }

        let mut bindings = Self::new();
        let mut slots = items.into_iter().enumerate();
        while let Some((index, name)) = slots.next() {
            let (_, expr) = slots.next().ok_or(DeclError::OddBindings { len })?;
            let name = match name {
                BindingItem::Name(name) => name,
                BindingItem::Expr(_) => return Err(DeclError::BindingName { index }),
            };
            let fixture = match expr {
                BindingItem::Expr(fixture) => fixture,
                BindingItem::Name(found) => {
                    return Err(DeclError::BindingExpr {
                        index: index + 1,
                        found: found.to_string(),
                    });
                }
            };
            bindings.push(name, fixture)?;
        }
        Ok(bindings)
    }

    /// Build from (name, expression) pairs.
    ///
    /// ## Errors
    /// - [`DeclError::DuplicateBinding`] when a name repeats.
    pub fn try_from_pairs<I, N>(pairs: I) -> Result<Self, DeclError>
    where
        I: IntoIterator<Item = (N, Fixture)>,
        N: Into<Symbol>,
    {
        let mut bindings = Self::new();
        for (name, fixture) in pairs {
            bindings.push(name.into(), fixture)?;
        }
        Ok(bindings)
    }

    fn push(&mut self, name: Symbol, fixture: Fixture) -> Result<(), DeclError> {
        if self.pairs.iter().any(|(bound, _)| *bound == name) {
            return Err(DeclError::DuplicateBinding { name: name.to_string() });
        }
        self.pairs.push((name, fixture));
        Ok(())
    }

    /// The bound names, in declaration order.
    pub fn names(&self) -> Vec<Symbol> {
        self.pairs.iter().map(|(name, _)| name.clone()).collect()
    }

    /// One context entry per binding, in declaration order.
    pub fn entries(&self, lifecycle: Lifecycle) -> Vec<ContextEntry> {
        self.pairs
            .iter()
            .map(|(name, fixture)| ContextEntry::new(name.clone(), fixture.clone(), lifecycle))
            .collect()
    }

    /// Evaluate every binding now, on top of `base`.
    pub fn evaluate(&self, base: &Context) -> Result<Context, Failure> {
        let mut ctx = base.clone();
        ctx.bind_entries(&self.entries(Lifecycle::PerTest))?;
        Ok(ctx)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(pairs: usize) -> Vec<BindingItem> {
        (0..pairs)
            .flat_map(|i| {
                [
                    BindingItem::from(format!("n{i}").as_str()),
                    BindingItem::from(Fixture::value(i)),
                ]
            })
            .collect()
    }

    #[test]
    fn test_names_are_exactly_the_name_slots() {
        for pairs in 1..=3 {
            let bindings = Bindings::try_from_flat(flat(pairs)).unwrap();
            let expected: Vec<Symbol> = (0..pairs).map(|i| Symbol::new(format!("n{i}"))).collect();
            assert_eq!(bindings.names(), expected, "{pairs} pair(s)");
        }
    }

    #[test]
    fn test_odd_length_is_rejected() {
        let mut items = flat(2);
        items.push(BindingItem::from("dangling"));
        assert_eq!(
            Bindings::try_from_flat(items).unwrap_err(),
            DeclError::OddBindings { len: 5 }
        );
    }

    #[test]
    fn test_slots_of_the_wrong_kind_are_rejected() {
        let items = vec![BindingItem::from(Fixture::value(1)), BindingItem::from("x")];
        assert_eq!(
            Bindings::try_from_flat(items).unwrap_err(),
            DeclError::BindingName { index: 0 }
        );

        let items = vec![BindingItem::from("x"), BindingItem::from("y")];
        assert_eq!(
            Bindings::try_from_flat(items).unwrap_err(),
            DeclError::BindingExpr {
                index: 1,
                found: "y".into()
            }
        );
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = Bindings::try_from_pairs([("x", Fixture::value(1)), ("x", Fixture::value(2))]).unwrap_err();
        assert_eq!(err, DeclError::DuplicateBinding { name: "x".into() });
    }

    #[test]
    fn test_evaluate_sees_earlier_names() {
        let bindings = Bindings::try_from_pairs([
            ("x", Fixture::value(1_i64)),
            ("y", Fixture::new(|ctx| Ok(ctx.get::<i64>("x")? * 10))),
        ])
        .unwrap();

        let ctx = bindings.evaluate(&Context::new()).unwrap();
        assert_eq!(*ctx.get::<i64>("y").unwrap(), 10);
    }
}
