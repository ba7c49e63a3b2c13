//! Layering guardrails to keep the declaration model free of runner concerns.
//!
//! `speclet_core` builds trees and nothing else: no CLI parsing, no log subscriber, no terminal output.
//! These tests scan its manifest and sources and fail when runner-side code leaks in.

const CORE_MANIFEST: &str = include_str!("../crates/speclet_core/Cargo.toml");

const CORE_SOURCES: &[(&str, &str)] = &[
    ("args.rs", include_str!("../crates/speclet_core/src/args.rs")),
    ("bindings.rs", include_str!("../crates/speclet_core/src/bindings.rs")),
    ("context.rs", include_str!("../crates/speclet_core/src/context.rs")),
    ("decl.rs", include_str!("../crates/speclet_core/src/decl.rs")),
    ("errors.rs", include_str!("../crates/speclet_core/src/errors.rs")),
    ("failure.rs", include_str!("../crates/speclet_core/src/failure.rs")),
    ("inject.rs", include_str!("../crates/speclet_core/src/inject.rs")),
    ("metadata.rs", include_str!("../crates/speclet_core/src/metadata.rs")),
    ("registry.rs", include_str!("../crates/speclet_core/src/registry.rs")),
    ("tree.rs", include_str!("../crates/speclet_core/src/tree.rs")),
];

fn dependency_names(manifest: &str) -> Vec<&str> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((name, _)) = line.split_once('=') {
            names.push(name.trim());
        }
    }
    names
}

#[test]
fn core_does_not_depend_on_runner_crates() {
    let names = dependency_names(CORE_MANIFEST);
    assert!(names.contains(&"thiserror"), "manifest scan found {names:?}");

    for forbidden in ["clap", "tracing-subscriber", "speclet", "speclet_stdlib"] {
        assert!(
            !names.contains(&forbidden),
            "`{forbidden}` must not appear in speclet_core's [dependencies]"
        );
    }
}

#[test]
fn core_sources_do_no_terminal_io() {
    for (file, source) in CORE_SOURCES {
        for forbidden in ["println!", "eprintln!", "std::io", "process::exit"] {
            assert!(!source.contains(forbidden), "{file} uses `{forbidden}`");
        }
    }
}
