//! # sniff-lint
//!
//! Token-based coding-standard linter for PHP sources, with a transactional
//! auto-fixer.
//!
//! This is the main facade crate that re-exports the core engine and the
//! built-in rules.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sniff_lint::rules::Preset;
//!
//! let outcome = sniff_lint::fix_source(Preset::Recommended, "<?php\n$a = [1,2];\n")?;
//! assert_eq!(outcome.fixed.as_deref(), Some("<?php\n$a = [1, 2];\n"));
//! ```
//!
//! ## Suppression Comments
//!
//! A comment on the offending line, or the line above it, silences a rule:
//!
//! ```php
//! // sniff-lint: allow(array-declaration) reason="generated table"
//! $table = [1,2,3];
//! ```
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use sniff_lint::Engine;
//! use sniff_lint::rules::Preset;
//!
//! let engine = Engine::builder()
//!     .root("./src")
//!     .rules(Preset::Strict.rules())
//!     .fix(true)
//!     .build()?;
//!
//! let analysis = engine.analyze()?;
//! println!("{}", analysis.report.summary());
//! ```

#![forbid(unsafe_code)]

pub use sniff_lint_core::*;

/// Built-in rules and presets.
pub mod rules {
    pub use sniff_lint_rules::*;
}

mod runner;

pub use runner::{check_source, fix_source, SOURCE_NAME};
