//! Integration Test: Sleep Prohibition
//!
//! **Policy**: The scene orchestration core MUST NOT sleep. Timed transitions
//! read time from an injected clock, and the host decides when to tick.
//! **Exceptions**: `clock.rs`, where the system clock implements `Clock::sleep`.

use architectural_enforcement::{core_src, find_violations};

/// Test that core production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_core() {
    let violations = find_violations(&core_src(), &["clock.rs"], |code| {
        code.contains("::sleep(") || code.contains(".sleep(")
    });

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in the core!\n");

        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }

        eprintln!("\n✅ ACCEPTABLE:");
        eprintln!("  - SystemClock::sleep in clock.rs");
        eprintln!("  - Test code (#[cfg(test)] modules)");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleeping inside a transition to pace it (use Pacing and a Clock)");

        panic!(
            "\nFound {} sleep violation(s) in the core.\nFix these before merging!",
            violations.len()
        );
    }
}

#[test]
fn test_detector_flags_sleep() {
    let dir = std::env::temp_dir().join("stagehand-sleep-detector");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("bad.rs"),
        "fn pace() {\n    std::thread::sleep(d);\n}\n#[cfg(test)]\nfn ok() { clock.sleep(d); }\n",
    )
    .unwrap();

    let violations = find_violations(&dir, &[], |code| code.contains("::sleep("));
    std::fs::remove_dir_all(&dir).unwrap();

    assert_eq!(violations.len(), 1);
    assert!(violations[0].ends_with("bad.rs:2 - std::thread::sleep(d);"));
}
