//! # sniff-lint-core
//!
//! Core framework for token-driven lint-and-fix engines.
//!
//! This crate provides the foundational traits and types:
//!
//! - [`Token`] and [`TokenStream`], with bracket partners and nesting depth
//! - [`Tokenizer`] seam and the reference [`PhpTokenizer`]
//! - [`Rule`] trait and the [`Dispatcher`] that routes tokens to rules
//! - [`RuleContext`], the single entry point for emitting violations and
//!   requesting fixes
//! - [`Fixer`] with atomic [`Changeset`]s
//! - [`Engine`] running the fix/re-tokenize loop over files
//! - [`Violation`] and [`Report`] for representing findings
//!
//! ## Example
//!
//! ```ignore
//! use sniff_lint_core::{Engine, Severity};
//!
//! let engine = Engine::builder()
//!     .root("./src")
//!     .rule(MyRule::new())
//!     .fix(true)
//!     .build()?;
//!
//! let analysis = engine.analyze()?;
//! println!("{}", analysis.report.summary());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod dispatcher;
mod engine;
mod fixer;
mod rule;
mod token;
mod tokenizer;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use config::{AnalyzerConfig, Config, ConfigError, FixerConfig, RuleConfig, DEFAULT_MAX_PASSES};
pub use context::{FileContext, RuleContext, ViolationId};
pub use dispatcher::{DispatchStats, Dispatcher};
pub use engine::{
    Analysis, Engine, EngineBuilder, EngineError, FileOutcome, FixedFile, FIXED_POINT_NOT_REACHED,
    FIX_BROKE_SOURCE,
};
pub use fixer::{Changeset, ChangesetConflict, Edit, Fixer};
pub use rule::{Rule, RuleBox, RuleError, Scan};
pub use token::{Token, TokenKind, TokenStream};
pub use tokenizer::{PhpTokenizer, TokenizeError, Tokenizer};
pub use types::{Location, Report, ReportFilter, Severity, Violation, ViolationDiagnostic};
pub use utils::suppression::{AllowDirective, Suppressions};
