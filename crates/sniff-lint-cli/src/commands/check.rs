//! Check command implementation.

use anyhow::{Context, Result};
use sniff_lint_core::Severity;
use std::process::ExitCode;

use super::{load_config, LintOptions};
use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command.
///
/// Fails the process when a violation reaches `level`, or the config's
/// `fail_on` when no level is given.
pub fn run(
    options: &LintOptions,
    source: &ConfigSource,
    format: OutputFormat,
    level: Option<Severity>,
) -> Result<ExitCode> {
    let config = load_config(source)?;
    let fail_on = level.unwrap_or_else(|| config.fail_on_severity());

    let engine = options.engine(config, false)?;
    tracing::info!(
        "Checking {} with {} rules",
        options.path.display(),
        engine.rule_count()
    );

    let analysis = engine.analyze().context("Analysis failed")?;
    super::output::print(&analysis.report, engine.root(), format)?;

    if analysis.report.has_violations_at(fail_on) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
