//! Property-based tests for the declaration model
//!
//! These tests use proptest to check the structural invariants of declarations: the pending rule,
//! order-preserving flattening, binding-name extraction and registration naming.

use proptest::prelude::*;
use speclet_core::{Arg, BindingItem, Bindings, DeclSite, Fixture, Node, Registry, describe, it, testing};

fn site() -> DeclSite {
    DeclSite::new("tests/property_tests.rs", 1, 1, "property_tests")
}

/// Children grouped into nested lists; `None` stands for an absent child.
fn grouped_children() -> impl Strategy<Value = Vec<Vec<Option<u8>>>> {
    prop::collection::vec(prop::collection::vec(prop::option::of(any::<u8>()), 0..4), 0..5)
}

fn to_args(groups: &[Vec<Option<u8>>]) -> Vec<Arg> {
    groups
        .iter()
        .map(|group| {
            let items: Vec<Arg> = group
                .iter()
                .map(|label| match label {
                    Some(label) => it(site(), vec![label.to_string().into(), true.into()]).into(),
                    None => Arg::Nil,
                })
                .collect();
            Arg::List(items)
        })
        .collect()
}

fn case_docs(nodes: &[Node]) -> Vec<String> {
    nodes
        .iter()
        .filter_map(|node| match node {
            Node::Case(case) => case.metadata().doc().map(str::to_string),
            Node::Suite(_) => None,
        })
        .collect()
}

// =============================================================================
// Pending and flattening
// =============================================================================

proptest! {
    /// Property: a suite is pending exactly when no child survives nil removal
    #[test]
    fn pending_iff_flattened_body_is_empty(groups in grouped_children()) {
        let present = groups.iter().flatten().filter(|label| label.is_some()).count();
        let suite = testing(site(), move || to_args(&groups));

        let sequence = suite.realize().expect("realize failed");
        prop_assert_eq!(sequence.metadata().pending(), present == 0);
        prop_assert_eq!(sequence.children().len(), present);
    }

    /// Property: flattening nested lists keeps declaration order
    #[test]
    fn flattening_preserves_order(groups in grouped_children()) {
        let expected: Vec<String> = groups.iter().flatten().flatten().map(u8::to_string).collect();
        let suite = testing(site(), move || to_args(&groups));

        let sequence = suite.realize().expect("realize failed");
        prop_assert_eq!(case_docs(sequence.children()), expected);
    }

    /// Property: an `it` made only of absent children is pending
    #[test]
    fn it_with_only_nils_is_pending(nils in 0usize..5, with_expr in any::<bool>()) {
        let mut args: Vec<Arg> = vec!["case".into()];
        args.extend((0..nils).map(|_| Arg::List(vec![Arg::Nil])));
        if with_expr {
            args.push(true.into());
        }

        let case = it(site(), args).expect("it failed");
        prop_assert_eq!(case.metadata().pending(), !with_expr);
    }
}

// =============================================================================
// Bindings and registrations
// =============================================================================

proptest! {
    /// Property: binding names are exactly the even slots of the flat list
    #[test]
    fn binding_names_are_the_name_slots(names in prop::collection::hash_set("[a-z]{1,6}", 1..6)) {
        let names: Vec<String> = names.into_iter().collect();
        let flat: Vec<BindingItem> = names
            .iter()
            .enumerate()
            .flat_map(|(i, name)| [BindingItem::from(name.as_str()), BindingItem::from(Fixture::value(i))])
            .collect();

        let bindings = Bindings::try_from_flat(flat).expect("valid bindings");
        let extracted: Vec<String> = bindings.names().iter().map(|n| n.as_str().to_string()).collect();
        prop_assert_eq!(extracted, names);
    }

    /// Property: every `describe` call gets its own registration
    #[test]
    fn describe_names_are_distinct(calls in 1usize..10) {
        let mut registry = Registry::new();
        let mut names: Vec<_> = (0..calls)
            .map(|_| describe(&mut registry, site(), || vec!["same".into()]))
            .collect();
        names.sort();
        names.dedup();

        prop_assert_eq!(names.len(), calls);
        prop_assert_eq!(registry.len(), calls);
    }
}
