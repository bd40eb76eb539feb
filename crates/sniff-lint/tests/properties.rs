//! Behavioral properties of the fix loop, checked end to end.

use sniff_lint::rules::{ArrayDeclaration, Preset};
use sniff_lint::{
    check_source, fix_source, Engine, Rule, RuleBox, RuleContext, RuleError, Scan, TokenKind,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MESSY: &str = "<?php\n\
$config = array('name'=>'app' ,\n\
  'debug' => true, 'timeout'  =>  30\n\
    );\n";

#[test]
fn fix_loop_reaches_alignment() {
    let outcome = fix_source(Preset::Recommended, MESSY).unwrap();
    assert!(outcome.converged);
    assert_eq!(outcome.passes, 5);
    assert_eq!(
        outcome.fixed.as_deref(),
        Some(
            "<?php\n\
$config = array(\n\
\x20   'name'    => 'app',\n\
\x20   'debug'   => true,\n\
\x20   'timeout' => 30,\n\
);\n"
        )
    );
}

#[test]
fn fixed_output_is_a_fixed_point() {
    let first = fix_source(Preset::Recommended, MESSY).unwrap();
    let fixed = first.fixed.expect("messy input should change");

    let second = fix_source(Preset::Recommended, &fixed).unwrap();
    assert!(second.violations.is_empty(), "{:?}", second.violations);
    assert!(second.fixed.is_none());
    assert_eq!(second.passes, 1);
}

#[test]
fn aligned_keyed_literal_reports_nothing() {
    let source = "<?php\n\
function config()\n\
{\n\
    return [\n\
        'id'       => 1,\n\
        'handlers' => [\n\
            'a',\n\
            'b',\n\
        ],\n\
        'call'     => foo(1, [2, 3], fn($x) => $x),\n\
    ];\n\
}\n";
    let outcome = check_source(Preset::Strict, source).unwrap();
    assert!(outcome.violations.is_empty(), "{:?}", outcome.violations);
}

#[test]
fn nested_commas_are_not_element_separators() {
    let source = "<?php\n$a = [\n    'k' => foo(1, 2, 3),\n    'l' => [4, 5],\n];\n";
    assert!(check_source(Preset::Recommended, source)
        .unwrap()
        .violations
        .is_empty());

    // Splitting on the inner commas would make these look like bare values.
    let source = "<?php\n$a = [\n    'k' => foo(1,\n        2),\n];\n";
    let outcome = check_source(Preset::Minimal, source).unwrap();
    assert!(outcome
        .violations
        .iter()
        .all(|v| v.code != "NoKeySpecified" && v.code != "ValueNoNewline"));
}

#[test]
fn suppressed_violations_are_neither_reported_nor_fixed() {
    let source = "<?php\n// sniff-lint: allow(array-declaration)\n$a = [1,2,];\n$b = [1,2];\n";
    let outcome = fix_source(Preset::Minimal, source).unwrap();

    assert!(outcome.violations.iter().all(|v| v.location.line == Some(4)));
    assert_eq!(
        outcome.fixed.as_deref(),
        Some("<?php\n// sniff-lint: allow(array-declaration)\n$a = [1,2,];\n$b = [1, 2];\n")
    );
}

/// Rule `.0` rewrites `$old` to `.1`.
struct Rename(&'static str, &'static str);

impl Rule for Rename {
    fn name(&self) -> &'static str {
        self.0
    }
    fn code(&self) -> &'static str {
        "T1"
    }
    fn interests(&self) -> &'static [TokenKind] {
        &[TokenKind::Variable]
    }
    fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
        if ctx.stream()[position].text == "$old"
            && ctx.add_fixable_error("Renamed", format!("Use {}", self.1), Some(position))
        {
            ctx.replace_token(position, self.1);
        }
        Ok(Scan::Continue)
    }
}

/// Edits the same token twice inside one changeset.
struct DoubleEdit;

impl Rule for DoubleEdit {
    fn name(&self) -> &'static str {
        "double-edit"
    }
    fn code(&self) -> &'static str {
        "T2"
    }
    fn interests(&self) -> &'static [TokenKind] {
        &[TokenKind::Number]
    }
    fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
        if ctx.add_fixable_error("Twice", "Number edited twice", Some(position)) {
            let mut changeset = ctx.begin_changeset();
            changeset.replace(position, "1").insert_before(position, "+");
            ctx.end_changeset(changeset);
        }
        Ok(Scan::Continue)
    }
}

fn engine_with(rules: Vec<RuleBox>) -> Engine {
    Engine::builder()
        .root("")
        .rules(rules)
        .fix(true)
        .build()
        .unwrap()
}

#[test]
fn first_changeset_on_a_token_wins() {
    let engine = engine_with(vec![
        Box::new(Rename("to-new", "$new")),
        Box::new(Rename("to-other", "$other")),
    ]);
    let outcome = engine
        .check_source(Path::new("a.php"), "<?php\n$old = 1;\n")
        .unwrap();

    assert_eq!(outcome.fixed.as_deref(), Some("<?php\n$new = 1;\n"));
    assert!(outcome.converged);
    assert_eq!(outcome.passes, 2);

    // The losing rename no longer applies once `$old` is gone.
    let fixed: Vec<_> = outcome
        .violations
        .iter()
        .map(|v| (v.rule.as_deref(), v.fixed))
        .collect();
    assert_eq!(fixed, vec![(Some("to-new"), true)]);
}

#[test]
fn rejected_fix_resolved_later_is_not_left_behind() {
    // The tab and the indentation share a token; only one changeset lands.
    let source = "<?php\n$a = [\n\t1,\n];\n";
    let outcome = fix_source(Preset::Recommended, source).unwrap();
    let fixed = outcome.fixed.clone().expect("tab should be replaced");
    assert_eq!(fixed, "<?php\n$a = [\n    1,\n];\n");

    let recheck = check_source(Preset::Recommended, &fixed).unwrap();
    assert!(recheck.violations.is_empty(), "{:?}", recheck.violations);

    let remaining: Vec<_> = outcome.violations.iter().filter(|v| !v.fixed).collect();
    assert!(remaining.is_empty(), "{remaining:?}");
}

#[test]
fn structural_errors_are_reported_once_across_passes() {
    let source = "<?php\n$a = [\n    'k' => 1, 2,\n];\n";
    let outcome = fix_source(Preset::Recommended, source).unwrap();
    assert!(outcome.passes > 1);

    let structural: Vec<_> = outcome
        .violations
        .iter()
        .filter(|v| v.code == "NoKeySpecified")
        .collect();
    assert_eq!(structural.len(), 1, "{:?}", outcome.violations);
    assert!(!structural[0].fixed);
}

#[test]
fn conflicting_changeset_is_dropped_whole() {
    let engine = engine_with(vec![Box::new(DoubleEdit)]);
    let outcome = engine
        .check_source(Path::new("a.php"), "<?php\n$a = 7;\n")
        .unwrap();

    assert!(outcome.fixed.is_none());
    assert_eq!(outcome.violations.len(), 1);
    assert!(!outcome.violations[0].fixed);
    assert_eq!(outcome.passes, 1);
}

#[test]
fn files_are_isolated() {
    let dir = TempDir::new().unwrap();
    let write = |rel: &str, content: &str| fs::write(dir.path().join(rel), content).unwrap();
    write("a.php", "<?php\n$a = [1,2];\n");
    write("broken.php", "<?php\n$b = 'never closed;\n");
    write("c.php", "<?php\n$c = [3, 4];\n");

    let analysis = Engine::builder()
        .root(dir.path())
        .rule(ArrayDeclaration::new())
        .fix(true)
        .build()
        .unwrap()
        .analyze()
        .unwrap();

    assert_eq!(
        analysis.report.files,
        vec![PathBuf::from("a.php"), PathBuf::from("c.php")]
    );
    assert_eq!(analysis.report.total_errors(), 1);
    assert_eq!(analysis.fixed_files.len(), 1);
    assert_eq!(analysis.fixed_files[0].content, "<?php\n$a = [1, 2];\n");
}
