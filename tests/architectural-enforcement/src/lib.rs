//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The core never blocks on sleep() outside its clock
//! - The core stays free of terminal UI crates
//! - Production code in the core propagates errors instead of panicking
//!
//! These tests are designed to catch violations early in the development cycle.
//! The helpers below are shared by the test files under `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, two levels above this package
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Source directory of the scene orchestration core
pub fn core_src() -> PathBuf {
    workspace_root().join("stagehand/core/src")
}

/// All `.rs` files below `dir`
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Lines of production code in `content`, with their 1-based line numbers
///
/// Stops at the first `#[cfg(test)]` and skips comment lines, including doc
/// comments and the examples inside them.
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
        .collect()
}

/// Production lines of every file below `dir` that match `is_violation`
///
/// Files named in `exempt` are skipped entirely.
pub fn find_violations(
    dir: &Path,
    exempt: &[&str],
    is_violation: impl Fn(&str) -> bool,
) -> Vec<String> {
    let mut violations = Vec::new();

    for path in rust_files(dir) {
        let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if exempt.contains(&name) {
            continue;
        }
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => continue,
        };

        for (line_number, code) in production_lines(&content) {
            if is_violation(code) {
                violations.push(format!(
                    "{}:{} - {}",
                    path.display(),
                    line_number,
                    code.trim()
                ));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let code = "fn a() {}\n// note\n/// doc\nlet x = 1; // trailing\n#[cfg(test)]\nfn b() {}\n";
        let lines = production_lines(code);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], (1, "fn a() {}"));
        assert_eq!(lines[1], (4, "let x = 1; "));
    }

    #[test]
    fn test_core_sources_are_found() {
        let files = rust_files(&core_src());
        assert!(
            files.iter().any(|p| p.ends_with("lib.rs")),
            "core lib.rs not found under {}",
            core_src().display()
        );
    }
}
