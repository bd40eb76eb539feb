//! Shared output formatting for lint results.

use anyhow::Result;
use miette::GraphicalReportHandler;
use serde::Serialize;
use sniff_lint_core::{Report, Violation, ViolationDiagnostic};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::OutputFormat;

/// Print a report in the specified format.
///
/// `root` is the directory report paths are relative to; text output reads
/// sources from it to render snippets.
pub fn print(report: &Report, root: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report, root)?,
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &Report, root: &Path) -> Result<()> {
    let handler = GraphicalReportHandler::new();
    let mut sources: HashMap<PathBuf, Option<String>> = HashMap::new();

    for violation in &report.violations {
        let diagnostic = diagnostic(violation, root, &mut sources);
        let mut rendered = String::new();
        handler.render_report(&mut rendered, &diagnostic)?;
        println!("{rendered}");
    }

    let summary_color = if report.total_errors() > 0 {
        "\x1b[31m"
    } else if report.total_warnings() > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    println!("{summary_color}{}\x1b[0m", report.summary());
    Ok(())
}

/// Builds a diagnostic, attaching the file source when the violation has a
/// position and the file is readable.
fn diagnostic(
    violation: &Violation,
    root: &Path,
    sources: &mut HashMap<PathBuf, Option<String>>,
) -> ViolationDiagnostic {
    let diagnostic = ViolationDiagnostic::from(violation);
    if violation.location.is_file_level() {
        return diagnostic;
    }
    let file = &violation.location.file;
    let content = sources
        .entry(file.clone())
        .or_insert_with(|| std::fs::read_to_string(root.join(file)).ok());
    match content {
        Some(content) => diagnostic.with_source(file, content.clone()),
        None => diagnostic,
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files_checked: usize,
    errors: usize,
    warnings: usize,
    notices: usize,
    fixed: usize,
    violations: &'a [Violation],
}

impl<'a> From<&'a Report> for JsonReport<'a> {
    fn from(report: &'a Report) -> Self {
        Self {
            files_checked: report.files_checked(),
            errors: report.total_errors(),
            warnings: report.total_warnings(),
            notices: report.total_notices(),
            fixed: report.fixed_count(),
            violations: &report.violations,
        }
    }
}

fn print_json(report: &Report) -> Result<()> {
    let json = serde_json::to_string_pretty(&JsonReport::from(report))?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &Report) {
    for violation in &report.violations {
        println!("{}", compact_line(violation));
    }
}

fn compact_line(v: &Violation) -> String {
    let position = match (v.location.line, v.location.column) {
        (Some(line), Some(column)) => format!(":{line}:{column}"),
        _ => String::new(),
    };
    let fixed = if v.fixed { " (fixed)" } else { "" };
    format!(
        "{}{position}: {} [{}] {}{fixed}",
        v.location.file.display(),
        v.severity,
        v.qualified_code(),
        v.message
    )
}
