//! Integration Test: Core UI Independence
//!
//! **Policy**: `stagehand-core` draws into its own `Canvas` and MUST NOT
//! depend on a terminal or window toolkit. Surfaces such as the demo
//! translate canvases into whatever they render with.

use std::fs;

use architectural_enforcement::{core_src, find_violations, workspace_root};

const FORBIDDEN_CRATES: &[&str] = &["ratatui", "crossterm", "tokio"];

#[test]
fn test_core_manifest_has_no_ui_crates() {
    let manifest = workspace_root().join("stagehand/core/Cargo.toml");
    let content = fs::read_to_string(&manifest).unwrap();

    let offending: Vec<&str> = FORBIDDEN_CRATES
        .iter()
        .copied()
        .filter(|name| {
            content.lines().map(str::trim_start).any(|line| {
                line.starts_with(&format!("{name} ")) || line.starts_with(&format!("{name}="))
            })
        })
        .collect();

    assert!(
        offending.is_empty(),
        "stagehand-core must not depend on {offending:?}"
    );
}

#[test]
fn test_core_sources_do_not_use_ui_crates() {
    let violations = find_violations(&core_src(), &[], |code| {
        FORBIDDEN_CRATES
            .iter()
            .any(|name| code.contains(&format!("{name}::")))
    });

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: UI or runtime crates used in the core!\n");
        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }
        panic!(
            "\nFound {} UI dependency violation(s) in the core.",
            violations.len()
        );
    }
}
