//! List rules command implementation.

use apilint_rules::{all_rules, COMPAT_RULES};

/// Runs the list-rules command.
pub fn run() {
    println!("Compatibility rules (first match wins):\n");
    println!("{:<6} {:<26} {:<13} Description", "Code", "Name", "Verdict");
    println!("{}", "-".repeat(90));

    for rule in COMPAT_RULES {
        println!(
            "{:<6} {:<26} {:<13} {}",
            rule.code,
            rule.name,
            rule.verdict.to_string(),
            rule.description
        );
    }

    println!("\nStructural rules:\n");
    println!("{:<6} {:<26} Description", "Code", "Name");
    println!("{}", "-".repeat(90));

    for rule in all_rules() {
        println!(
            "{:<6} {:<26} {}",
            rule.code(),
            rule.name(),
            rule.description()
        );
    }

    println!("\nPresets:");
    println!("  recommended  - GV1, GV2, DUP1 (default)");
    println!("  minimal      - DUP1 only");

    println!("\nUse --filter-errors to report only some structural rules, e.g.:");
    println!("  apilint after.txt before.txt --filter-errors GV1,DUP1");
    println!("  apilint after.txt before.txt --filter-errors NONE");
}
