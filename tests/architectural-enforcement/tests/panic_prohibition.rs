//! Integration Test: Panic Prohibition
//!
//! **Policy**: Production code in the core MUST propagate errors with `?` or
//! log and carry on. `unwrap()`, `expect()` and `panic!` are for tests.
//! **Exceptions**: `test_utils.rs`, compiled only for tests.

use architectural_enforcement::{core_src, find_violations};

#[test]
fn test_no_unwrap_in_core() {
    let violations = find_violations(&core_src(), &["test_utils.rs"], |code| {
        code.contains(".unwrap()") || code.contains(".expect(") || code.contains("panic!(")
    });

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Panicking calls found in core production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }
        eprintln!("\n✅ Use `?`, `ok_or`, `unwrap_or_default` or a logged fallback instead.");

        panic!(
            "\nFound {} panic violation(s) in the core.\nFix these before merging!",
            violations.len()
        );
    }
}
