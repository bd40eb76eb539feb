//! Fix command implementation.

use anyhow::{Context, Result};
use sniff_lint_core::{Analysis, ReportFilter};
use std::process::ExitCode;

use super::{load_config, LintOptions};
use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the fix command.
///
/// Writes corrected files back unless `dry_run` is set, then prints the
/// violations that could not be fixed.
pub fn run(options: &LintOptions, source: &ConfigSource, dry_run: bool) -> Result<ExitCode> {
    let config = load_config(source)?;
    let fail_on = config.fail_on_severity();

    let engine = options.engine(config, true)?;
    let analysis = engine.analyze().context("Analysis failed")?;

    if dry_run {
        for file in &analysis.fixed_files {
            println!("Would fix {}", file.path.display());
        }
    } else {
        write_fixed(&analysis)?;
    }

    let remaining = remaining(&analysis);
    super::output::print(&remaining, engine.root(), OutputFormat::Compact)?;
    println!(
        "Fixed {} violation(s) in {} file(s); {} remaining",
        analysis.report.fixed_count(),
        analysis.fixed_files.len(),
        remaining.violations.len()
    );

    if remaining.has_violations_at(fail_on) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn write_fixed(analysis: &Analysis) -> Result<()> {
    for file in &analysis.fixed_files {
        std::fs::write(&file.path, &file.content)
            .with_context(|| format!("Failed to write {}", file.path.display()))?;
        tracing::debug!("Wrote {}", file.path.display());
    }
    Ok(())
}

/// The report without violations the fixer already resolved.
fn remaining(analysis: &Analysis) -> sniff_lint_core::Report {
    let mut report = sniff_lint_core::Report::new();
    for file in &analysis.report.files {
        report.record_file(file.clone());
    }
    for violation in analysis.report.messages(&ReportFilter::all()) {
        if !violation.fixed {
            report.add(violation.clone());
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use sniff_lint_core::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fix_writes_files() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.php");
        fs::write(&file, "<?php\n$a = array(1,2);\n").unwrap();

        let options = LintOptions::new(tmp.path().to_path_buf(), None, Vec::new());
        let analysis = options.engine(Config::default(), true).unwrap().analyze().unwrap();
        assert_eq!(analysis.fixed_files.len(), 1);
        assert!(remaining(&analysis).violations.is_empty());

        write_fixed(&analysis).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "<?php\n$a = array(1, 2);\n");
    }
}
