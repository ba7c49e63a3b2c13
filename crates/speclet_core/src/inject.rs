//! Context injection: attaching fixture bindings to an already built sequence.
//!
//! ## Notes
//!
//! - Per-test bindings go onto every direct test case. Nested suites are wrapped lazily, so the
//!   bindings reach their descendants as per-test sequence entries once the suite is realized.
//! - Once bindings go onto the sequence itself and are evaluated once per activation.
//! - A once binding is evaluated before any test case exists, so it only sees once values of
//!   enclosing sequences, never per-test ones.

use crate::bindings::Bindings;
use crate::context::{ContextEntry, Lifecycle};
use crate::tree::{Node, TestSequence};

/// Attach `bindings` to `sequence` with the given lifecycle.
pub fn inject(sequence: TestSequence, bindings: &Bindings, lifecycle: Lifecycle) -> TestSequence {
    if bindings.is_empty() {
        return sequence;
    }
    let entries = bindings.entries(lifecycle);
    match lifecycle {
        Lifecycle::PerTest => sequence.map_children(|children| add_context(children, &entries)),
        Lifecycle::Once => sequence.with_outer_context(&entries),
    }
}

fn add_context(nodes: Vec<Node>, entries: &[ContextEntry]) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Case(case) => Node::Case(case.with_outer_context(entries)),
            Node::Suite(suite) => {
                let entries = entries.to_vec();
                Node::Suite(suite.map(move |sequence| sequence.with_outer_context(&entries)))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Fixture;
    use crate::metadata::{DeclSite, Metadata};
    use crate::tree::{Suite, TestCase};

    fn meta() -> Metadata {
        Metadata::merge(&[()], &DeclSite::new("t.rs", 1, 1, "t"), None, None)
    }

    fn case() -> TestCase {
        TestCase::new(meta(), |_| Ok(()))
    }

    fn names(entries: &[ContextEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name().as_str()).collect()
    }

    fn bindings(names: &[&str]) -> Bindings {
        Bindings::try_from_pairs(names.iter().map(|n| (*n, Fixture::value(0_u8)))).unwrap()
    }

    #[test]
    fn test_per_test_prepends_outer_entries_to_cases() {
        let inner = inject(TestSequence::new(meta(), vec![case().into()]), &bindings(&["y"]), Lifecycle::PerTest);
        let Node::Case(inner_case) = &inner.children()[0] else {
            panic!("expected a case");
        };
        let outer = inject(
            TestSequence::new(meta(), vec![inner_case.clone().into()]),
            &bindings(&["x"]),
            Lifecycle::PerTest,
        );

        let Node::Case(case) = &outer.children()[0] else {
            panic!("expected a case");
        };
        assert_eq!(names(case.context()), ["x", "y"]);
        assert!(outer.context().is_empty());
    }

    #[test]
    fn test_per_test_reaches_nested_suites_on_realization() {
        let nested = Suite::from_sequence(TestSequence::new(meta(), vec![case().into()]));
        let seq = inject(TestSequence::new(meta(), vec![nested.into()]), &bindings(&["x"]), Lifecycle::PerTest);

        let Node::Suite(suite) = &seq.children()[0] else {
            panic!("expected a suite");
        };
        let realized = suite.realize().unwrap();
        assert_eq!(names(realized.context()), ["x"]);
        assert_eq!(realized.context()[0].lifecycle(), Lifecycle::PerTest);
    }

    #[test]
    fn test_once_attaches_to_the_sequence() {
        let seq = inject(
            TestSequence::new(meta(), vec![case().into(), case().into()]),
            &bindings(&["a", "b"]),
            Lifecycle::Once,
        );

        assert_eq!(names(seq.context()), ["a", "b"]);
        assert!(seq.context().iter().all(|e| e.lifecycle() == Lifecycle::Once));
        assert!(seq.test_cases().all(|c| c.context().is_empty()));
    }

    #[test]
    fn test_original_nodes_are_untouched() {
        let original = case();
        let _ = inject(
            TestSequence::new(meta(), vec![original.clone().into()]),
            &bindings(&["x"]),
            Lifecycle::PerTest,
        );
        assert!(original.context().is_empty());
    }
}
