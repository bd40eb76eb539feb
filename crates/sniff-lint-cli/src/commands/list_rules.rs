//! List rules command implementation.

use sniff_lint_rules::{all_rules, Preset};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<10} {:<25} Description", "Code", "Fixable", "Name");
    println!("{}", "-".repeat(90));

    for rule in all_rules() {
        println!(
            "{:<8} {:<10} {:<25} {}",
            rule.code(),
            if is_fixable(rule.code()) { "yes" } else { "no" },
            rule.name(),
            rule.description()
        );
    }

    println!("\nPresets:");
    for preset in Preset::ALL {
        let codes: Vec<_> = preset.rules().iter().map(|r| r.code()).collect();
        let default = if preset == Preset::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {:<12} - {}{default}", preset.name(), codes.join(", "));
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  sniff-lint check --rules array-declaration,end-of-file-newline");
    println!("  sniff-lint fix --rules SL001,SL002");
}

/// Rules that only report, never fix.
fn is_fixable(code: &str) -> bool {
    !matches!(code, "SL005" | "SL008")
}
