//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# sniff-lint configuration

# Rule preset: "recommended", "strict" or "minimal"
preset = "recommended"

# Lowest severity that makes `sniff-lint check` exit non-zero
fail_on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude from analysis
exclude = [
    "**/vendor/**",
    "**/node_modules/**",
]

# Respect .gitignore files
respect_gitignore = true

# Number of files linted in parallel (default: one per core)
# parallelism = 4

[fixer]
# Lint-and-fix passes per file before giving up
max_passes = 10

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.array-declaration]
enabled = true
# severity = "warning"  # Override default severity
indent = 4
# Allow `=>` and values to start a new line in multi-line arrays
ignore_new_lines = true

[rules.disallow-tab-indent]
tab_width = 4

# [rules.valid-class-name]
# enabled = false
"#;

/// Name of the file created by `init`.
const CONFIG_FILE: &str = "sniff-lint.toml";

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("."), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure rules");
    println!("  2. Run: sniff-lint check");
    println!("  3. Run: sniff-lint fix");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    Ok(())
}
