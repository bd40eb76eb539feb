//! sniff-lint CLI tool.
//!
//! Usage:
//! ```bash
//! sniff-lint check [OPTIONS] [PATH]
//! sniff-lint fix [--dry-run] [PATH]
//! sniff-lint list-rules
//! sniff-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use sniff_lint_core::Severity;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

use commands::LintOptions;

/// Coding-standard linter and fixer for PHP sources
#[derive(Parser)]
#[command(name = "sniff-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report violations without changing files
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        #[command(flatten)]
        selection: Selection,

        /// Lowest severity that fails the run (overrides `fail_on`)
        #[arg(long, value_parser = parse_severity)]
        level: Option<Severity>,
    },

    /// Apply automatic fixes and report what remains
    Fix {
        /// Path to fix (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Show what would change without writing files
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        selection: Selection,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Rule and file selection shared by `check` and `fix`.
#[derive(clap::Args)]
struct Selection {
    /// Only run specific rules (comma-separated names or codes)
    #[arg(long)]
    rules: Option<String>,

    /// Exclude patterns (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Preset to start from (overrides `preset` in the config)
    #[arg(long)]
    preset: Option<String>,
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with source snippets.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    s.parse()
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            selection,
            level,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            let options = LintOptions::new(path, selection.rules, selection.exclude)
                .preset(selection.preset);
            commands::check::run(&options, &source, format, level)
        }
        Commands::Fix {
            path,
            dry_run,
            selection,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            let options = LintOptions::new(path, selection.rules, selection.exclude)
                .preset(selection.preset);
            commands::fix::run(&options, &source, dry_run)
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
