//! Core types for lint violations and reports.

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Severity level for lint violations, ordered `Notice < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Notice,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Upper-case label used in text reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Notice => "NOTICE",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notice => write!(f, "notice"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "notice" | "info" => Ok(Self::Notice),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown severity '{other}' (expected notice, warning or error)"
            )),
        }
    }
}

/// Source code location.
///
/// `line` and `column` are absent for file-level violations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to the project root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: Option<usize>,
    /// Column number (1-indexed, in characters).
    pub column: Option<usize>,
    /// Byte offset in the file (for miette integration).
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a location pointing at a line and column.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line: Some(line),
            column: Some(column),
            offset: 0,
            length: 0,
        }
    }

    /// Creates a location covering the whole file.
    #[must_use]
    pub fn file_level(file: PathBuf) -> Self {
        Self {
            file,
            line: None,
            column: None,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }

    /// Returns true if the location has no line.
    #[must_use]
    pub fn is_file_level(&self) -> bool {
        self.line.is_none()
    }

    fn position(&self) -> String {
        match (self.line, self.column) {
            (Some(line), Some(column)) => format!("{}:{line}:{column}", self.file.display()),
            (Some(line), None) => format!("{}:{line}", self.file.display()),
            _ => self.file.display().to_string(),
        }
    }
}

/// A lint violation found during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Name of the rule that raised it; `None` for engine-level findings.
    pub rule: Option<String>,
    /// Short identifier within the rule (e.g., "DoubleArrowNotAligned").
    pub code: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Whether the rule offered a fix for it.
    #[serde(default)]
    pub fixable: bool,
    /// Whether a fix for it was applied.
    #[serde(default)]
    pub fixed: bool,
}

impl Violation {
    /// Creates a new violation raised by `rule`.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        code: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: Some(rule.into()),
            code: code.into(),
            severity,
            location,
            message: message.into(),
            fixable: false,
            fixed: false,
        }
    }

    /// Creates a violation raised by the engine itself.
    #[must_use]
    pub fn engine(
        code: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: None,
            code: code.into(),
            severity,
            location,
            message: message.into(),
            fixable: false,
            fixed: false,
        }
    }

    /// Marks the violation as fixable.
    #[must_use]
    pub fn with_fixable(mut self, fixable: bool) -> Self {
        self.fixable = fixable;
        self
    }

    /// `rule.code`, or just the code for engine findings.
    #[must_use]
    pub fn qualified_code(&self) -> String {
        match &self.rule {
            Some(rule) => format!("{rule}.{}", self.code),
            None => self.code.clone(),
        }
    }

    /// Key used to collapse identical findings across fix passes.
    #[must_use]
    pub fn dedup_key(&self) -> (Option<String>, String, String, Option<usize>, Option<usize>) {
        (
            self.rule.clone(),
            self.code.clone(),
            self.message.clone(),
            self.location.line,
            self.location.column,
        )
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.location.position(),
            self.severity,
            self.qualified_code(),
            self.message
        )?;
        if self.fixed {
            write!(f, " (fixed)")?;
        }
        Ok(())
    }
}

/// Converts a Violation to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[source_code]
    source_code: Option<NamedSource<String>>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl ViolationDiagnostic {
    /// Attaches the file content so the span renders with context.
    ///
    /// Spans reaching past the end of `content` are clamped.
    #[must_use]
    pub fn with_source(mut self, name: &Path, content: String) -> Self {
        let len = content.len();
        let offset = self.span.offset().min(len);
        let length = self.span.len().min(len - offset);
        self.span = SourceSpan::from((offset, length));
        self.source_code = Some(NamedSource::new(name.display().to_string(), content));
        self
    }
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        let help = if v.fixed {
            Some("fixed automatically".to_string())
        } else if v.fixable {
            Some("fixable with `sniff-lint fix`".to_string())
        } else {
            None
        };
        Self {
            message: format!("[{}] {}", v.qualified_code(), v.message),
            help,
            source_code: None,
            span: SourceSpan::from((v.location.offset, v.location.length)),
            label_message: v.severity.label().to_string(),
        }
    }
}

/// Selects messages out of a [`Report`].
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Only messages for this file.
    pub file: Option<PathBuf>,
    /// Only messages at or above this severity.
    pub min_severity: Option<Severity>,
}

impl ReportFilter {
    /// Matches every message.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to one file.
    #[must_use]
    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Restricts to a minimum severity.
    #[must_use]
    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    fn matches(&self, v: &Violation) -> bool {
        self.file.as_ref().map_or(true, |f| &v.location.file == f)
            && self.min_severity.map_or(true, |s| v.severity >= s)
    }
}

/// Accumulated outcome of a lint or fix run.
///
/// Violations keep their emission order.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Every file that was linted, in processing order.
    pub files: Vec<PathBuf>,
    /// All violations found.
    pub violations: Vec<Violation>,
}

impl Report {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a linted file, even if it produced no violations.
    pub fn record_file(&mut self, file: impl Into<PathBuf>) {
        let file = file.into();
        if !self.files.contains(&file) {
            self.files.push(file);
        }
    }

    /// Adds a violation, recording its file as well.
    pub fn add(&mut self, violation: Violation) {
        self.record_file(violation.location.file.clone());
        self.violations.push(violation);
    }

    /// Violations matching `filter`, in emission order.
    #[must_use]
    pub fn messages(&self, filter: &ReportFilter) -> Vec<&Violation> {
        self.violations.iter().filter(|v| filter.matches(v)).collect()
    }

    /// Number of files linted.
    #[must_use]
    pub fn files_checked(&self) -> usize {
        self.files.len()
    }

    /// Number of notices.
    #[must_use]
    pub fn total_notices(&self) -> usize {
        self.count(Severity::Notice)
    }

    /// Number of warnings.
    #[must_use]
    pub fn total_warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Number of errors.
    #[must_use]
    pub fn total_errors(&self) -> usize {
        self.count(Severity::Error)
    }

    fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }

    /// Counts violations as `(errors, warnings, notices)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        (
            self.total_errors(),
            self.total_warnings(),
            self.total_notices(),
        )
    }

    /// Number of violations whose fix was applied.
    #[must_use]
    pub fn fixed_count(&self) -> usize {
        self.violations.iter().filter(|v| v.fixed).count()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.total_errors() > 0
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// One-line totals summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Files linted: {}, notices: {}, warnings: {}, errors: {}",
            self.files_checked(),
            self.total_notices(),
            self.total_warnings(),
            self.total_errors()
        )
    }

    /// Appends another report, keeping file and message order.
    pub fn merge(&mut self, other: Self) {
        for file in other.files {
            self.record_file(file);
        }
        self.violations.extend(other.violations);
    }
}
