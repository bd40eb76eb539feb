//! End-to-end scenarios: full PHP files through the preset rule sets.

use sniff_lint::rules::Preset;
use sniff_lint::{check_source, fix_source, FileOutcome};

fn codes(outcome: &FileOutcome) -> Vec<&str> {
    outcome.violations.iter().map(|v| v.code.as_str()).collect()
}

#[test]
fn misaligned_single_entry_is_rebuilt() {
    let source = "<?php\n$a = array('index'  => '2',\n );\n";

    let outcome = fix_source(Preset::Recommended, source).unwrap();
    assert_eq!(
        outcome.fixed.as_deref(),
        Some("<?php\n$a = array(\n    'index' => '2',\n);\n")
    );
    assert!(outcome.converged);
    assert!(codes(&outcome).contains(&"DoubleArrowNotAligned"));
    assert!(outcome.violations.iter().all(|v| v.fixed));
}

#[test]
fn trailing_comma_in_single_line_array() {
    let outcome = fix_source(Preset::Recommended, "<?php\n$a = [1, 2,];\n").unwrap();
    assert_eq!(codes(&outcome), vec!["CommaAfterLast"]);
    assert_eq!(outcome.fixed.as_deref(), Some("<?php\n$a = [1, 2];\n"));
}

#[test]
fn mixed_keys_are_reported_only() {
    let outcome = fix_source(Preset::Recommended, "<?php\n$a = [1, 'k' => 2];\n").unwrap();
    assert_eq!(codes(&outcome), vec!["KeySpecified"]);
    let violation = &outcome.violations[0];
    assert!(!violation.fixable);
    assert_eq!(violation.location.line, Some(2));
    assert!(outcome.fixed.is_none());
}

#[test]
fn closer_on_value_line_moves_down() {
    let outcome = fix_source(Preset::Recommended, "<?php\n$a = [\n    1,\n    2,];\n").unwrap();
    assert_eq!(codes(&outcome), vec!["CloseBraceNewLine"]);
    assert_eq!(
        outcome.fixed.as_deref(),
        Some("<?php\n$a = [\n    1,\n    2,\n];\n")
    );
}

#[test]
fn several_rules_fix_one_file() {
    let source = "<?php\nnamespace App;\n\nif (! $ok) {\n\t$x = - 1;\n}\n";

    let outcome = fix_source(Preset::Recommended, source).unwrap();
    assert_eq!(
        outcome.fixed.as_deref(),
        Some("<?php\n\nnamespace App;\n\nif (!$ok) {\n    $x = -1;\n}\n")
    );

    let mut found = codes(&outcome);
    found.sort_unstable();
    assert_eq!(
        found,
        vec!["ArithmeticUnary", "BlankLineBefore", "BooleanNot", "TabsUsed"]
    );
}

#[test]
fn report_only_rules_leave_text_alone() {
    let source = "<?php\n\ninterface Reader {}\n\nclass Foo {\n    public function a() {}\n    public $b;\n}\n";

    let outcome = fix_source(Preset::Recommended, source).unwrap();
    assert!(outcome.fixed.is_none());
    let mut found = codes(&outcome);
    found.sort_unstable();
    assert_eq!(found, vec!["Invalid", "InvalidInterfaceName"]);
}

#[test]
fn minimal_preset_ignores_other_rules() {
    let source = "<?php\nif (! $ok) {\n\t$a = [1,2];\n}";
    let outcome = check_source(Preset::Minimal, source).unwrap();
    assert_eq!(codes(&outcome), vec!["NoSpaceAfterComma"]);

    let outcome = check_source(Preset::Recommended, source).unwrap();
    assert!(codes(&outcome).contains(&"NoneFound"));
}

#[test]
fn strict_preset_flags_values_on_their_own_line() {
    let source = "<?php\n$a = [\n    'a' =>\n        [1],\n];\n";

    assert!(check_source(Preset::Recommended, source)
        .unwrap()
        .violations
        .is_empty());

    let outcome = fix_source(Preset::Strict, source).unwrap();
    assert_eq!(codes(&outcome), vec!["ValueNotAligned"]);
    assert_eq!(
        outcome.fixed.as_deref(),
        Some("<?php\n$a = [\n    'a' => [1],\n];\n")
    );
}

#[test]
fn report_messages_snapshot() {
    let source = "<?php\n$a = [\n    'a' => 1,\n    'bb' => 2\n];";
    let outcome = check_source(Preset::Recommended, source).unwrap();
    let lines: Vec<String> = outcome
        .violations
        .iter()
        .map(|v| {
            format!(
                "{:?}:{:?} {} {} {}",
                v.location.line,
                v.location.column,
                v.severity.label(),
                v.qualified_code(),
                v.message
            )
        })
        .collect();
    insta::assert_debug_snapshot!(lines, @r###"
    [
        "Some(4):Some(13) ERROR array-declaration.NoCommaAfterLast Comma required after last value in array declaration",
        "Some(3):Some(9) ERROR array-declaration.DoubleArrowNotAligned Array double arrow not aligned correctly; expected 2 space(s) but found 1",
        "None:None ERROR end-of-file-newline.NoneFound Expected 1 newline at end of file; 0 found",
    ]
    "###);
}
