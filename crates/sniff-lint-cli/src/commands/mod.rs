//! Subcommand implementations.

pub mod check;
pub mod fix;
pub mod init;
pub mod list_rules;
pub mod output;

use anyhow::{Context, Result};
use sniff_lint_core::{Config, Engine, RuleBox};
use sniff_lint_rules::Preset;
use std::path::PathBuf;

use crate::config_resolver::ConfigSource;

/// Target and rule selection shared by `check` and `fix`.
#[derive(Debug, Clone, Default)]
pub struct LintOptions {
    /// File or directory to lint.
    pub path: PathBuf,
    /// Comma-separated rule names or codes.
    pub rules: Option<String>,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
    /// Preset overriding the config's `preset`.
    pub preset: Option<String>,
}

impl LintOptions {
    /// Creates options for `path`.
    #[must_use]
    pub fn new(path: PathBuf, rules: Option<String>, exclude: Vec<String>) -> Self {
        Self {
            path,
            rules,
            exclude,
            preset: None,
        }
    }

    /// Sets the preset override.
    #[must_use]
    pub fn preset(mut self, preset: Option<String>) -> Self {
        self.preset = preset;
        self
    }

    /// Builds an engine for these options.
    ///
    /// A single file target lints just that file, rooted at its directory.
    pub fn engine(&self, config: Config, fix: bool) -> Result<Engine> {
        let rules = select_rules(&config, self.preset.as_deref(), self.rules.as_deref())?;

        let mut builder = Engine::builder().fix(fix);
        if self.path.is_file() {
            let root = self
                .path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default();
            let name = self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .context("target file has no name")?;
            builder = builder
                .root(root)
                .include(glob_escape(&name))
                .fail_on_parse_error(true);
        } else {
            builder = builder.root(&self.path);
        }

        for pattern in &self.exclude {
            builder = builder.exclude(pattern.clone());
        }

        builder
            .config(config)
            .rules(rules)
            .build()
            .context("Failed to build engine")
    }
}

/// Loads the resolved configuration, or defaults.
pub fn load_config(source: &ConfigSource) -> Result<Config> {
    match source {
        ConfigSource::Default => Ok(Config::default()),
        other => {
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
        }
    }
}

/// Picks the preset's rules, optionally narrowed to `filter`.
///
/// Filtered names may reach outside a minimal preset; they are looked up in
/// the full rule set.
pub fn select_rules(
    config: &Config,
    preset_override: Option<&str>,
    filter: Option<&str>,
) -> Result<Vec<RuleBox>> {
    let preset_name = preset_override.or(config.preset.as_deref());
    let preset = match preset_name {
        Some(name) => name.parse::<Preset>().map_err(anyhow::Error::msg)?,
        None => Preset::default(),
    };

    let Some(filter) = filter else {
        return Ok(preset.rules_with_config(config));
    };

    let pool = match preset {
        Preset::Minimal => Preset::Recommended,
        other => other,
    }
    .rules_with_config(config);

    let wanted: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    for name in &wanted {
        if !pool
            .iter()
            .any(|rule| rule.name() == *name || rule.code().eq_ignore_ascii_case(name))
        {
            tracing::warn!("Unknown rule: {}", name);
        }
    }

    Ok(pool
        .into_iter()
        .filter(|rule| {
            wanted
                .iter()
                .any(|name| rule.name() == *name || rule.code().eq_ignore_ascii_case(name))
        })
        .collect())
}

/// Escapes glob metacharacters in a literal file name.
fn glob_escape(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '*' | '?' | '[' | ']' => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
