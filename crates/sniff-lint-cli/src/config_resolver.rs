//! Configuration file resolution with global fallback.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `sniff-lint.toml` or `.sniff-lint.toml` in the linted directory or any
//!    parent, up to the directory holding `composer.json`
//! 3. `~/.sniff-lint/config.toml` (global fallback)
//! 4. No config found → defaults
//!
//! When the linted path is a single file, the search starts at its parent.

use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Loaded from the global config directory (`~/.sniff-lint/`).
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config was loaded from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

/// Project-level config file names, checked in order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["sniff-lint.toml", ".sniff-lint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Marks the root of a PHP project; the upward search stops there.
const PROJECT_ROOT_MARKER: &str = "composer.json";

/// Environment variable overriding the global config directory.
const CONFIG_DIR_ENV: &str = "SNIFF_LINT_CONFIG_DIR";

/// Resolves the configuration file path.
///
/// See module-level docs for resolution order.
#[must_use]
pub fn resolve(target: &Path, explicit: Option<&Path>) -> ConfigSource {
    let project_dir = if target.is_file() {
        target.parent().unwrap_or(target)
    } else {
        target
    };
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Testable core: takes `global_dir` as a parameter to avoid env var races.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(candidate) = find_project_config(project_dir) {
        tracing::debug!("Found project config: {}", candidate.display());
        return ConfigSource::Project(candidate);
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.exists() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Walks from `start` towards the filesystem root, stopping after the first
/// directory that holds [`PROJECT_ROOT_MARKER`].
fn find_project_config(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let found = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.exists());
        if found.is_some() {
            return found;
        }
        if dir.join(PROJECT_ROOT_MARKER).exists() {
            tracing::debug!("Stopping config search at project root {}", dir.display());
            break;
        }
    }
    None
}

/// Returns the global config directory path.
///
/// Resolution: `$SNIFF_LINT_CONFIG_DIR` > `~/.sniff-lint/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".sniff-lint"))
}
