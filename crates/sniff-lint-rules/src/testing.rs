//! Shared helpers for rule unit tests.

use sniff_lint_core::{Engine, FileOutcome, PhpTokenizer, Rule, Violation};
use std::path::Path;

fn engine(rule: impl Rule + 'static, fix: bool) -> Engine {
    Engine::builder()
        .root("")
        .rule(rule)
        .fix(fix)
        .tokenizer(PhpTokenizer::snippet())
        .build()
        .expect("Failed to build engine")
}

/// Lints a code snippet (no open tag needed) in report-only mode.
pub(crate) fn check(rule: impl Rule + 'static, source: &str) -> Vec<Violation> {
    engine(rule, false)
        .check_source(Path::new("test.php"), source)
        .expect("snippet should tokenize")
        .violations
}

/// Runs the fix loop over a code snippet.
pub(crate) fn fix(rule: impl Rule + 'static, source: &str) -> FileOutcome {
    engine(rule, true)
        .check_source(Path::new("test.php"), source)
        .expect("snippet should tokenize")
}

/// Fixed text, or the input when nothing changed.
pub(crate) fn fixed_text(outcome: &FileOutcome, source: &str) -> String {
    outcome.fixed.clone().unwrap_or_else(|| source.to_string())
}

/// `code` of every violation, in report order.
pub(crate) fn codes(violations: &[Violation]) -> Vec<&str> {
    violations.iter().map(|v| v.code.as_str()).collect()
}
