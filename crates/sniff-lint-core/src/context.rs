//! Context types for rule execution.

use crate::fixer::{Changeset, Fixer};
use crate::token::{Token, TokenStream};
use crate::types::{Location, Severity, Violation};
use crate::utils::suppression::Suppressions;
use std::path::{Path, PathBuf};

/// Metadata about the file being analyzed.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Path to the file as discovered.
    pub path: &'a Path,
    /// File contents for the current pass.
    pub content: &'a str,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);
        Self {
            path,
            content,
            relative_path,
        }
    }

    /// Calculates the byte offset for a line and character column.
    ///
    /// # Arguments
    ///
    /// * `line` - 1-indexed line number
    /// * `column` - 1-indexed column number, counted in characters
    ///
    /// # Returns
    ///
    /// Byte offset from the start of the file, clamped to the content length.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> usize {
        if line == 0 {
            return 0;
        }

        let mut offset = 0;
        for (i, line_content) in self.content.split('\n').enumerate() {
            if i + 1 == line {
                let within = line_content
                    .char_indices()
                    .nth(column.saturating_sub(1))
                    .map_or(line_content.len(), |(byte, _)| byte);
                return offset + within;
            }
            offset += line_content.len() + 1;
        }

        self.content.len()
    }
}

/// Handle to a recorded violation; empty when the violation was suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViolationId(Option<usize>);

impl ViolationId {
    /// Returns true if the violation landed in the report.
    #[must_use]
    pub fn is_recorded(self) -> bool {
        self.0.is_some()
    }
}

/// Line, column and span length of byte `offset` inside `token`. The span
/// stops at the end of that line.
fn position_within(token: &Token, offset: usize) -> (usize, usize, usize) {
    let offset = offset.min(token.text.len());
    let head = token.text.get(..offset).unwrap_or_default();
    let tail = token.text.get(offset..).unwrap_or_default();
    let length = tail.find('\n').unwrap_or(tail.len());
    match head.rfind('\n') {
        Some(newline) => (
            token.line + head.matches('\n').count(),
            head[newline + 1..].chars().count() + 1,
            length,
        ),
        None => (token.line, token.column + head.chars().count(), length),
    }
}

/// The single entry point rules use to read the stream, report violations
/// and request fixes.
///
/// Every fix call is gated on the most recent [`RuleContext::emit_fixable`]
/// having returned `true`; a successful edit marks that violation fixed.
pub struct RuleContext<'a> {
    file: &'a FileContext<'a>,
    stream: &'a TokenStream,
    fixer: &'a mut Fixer,
    sink: &'a mut Vec<Violation>,
    suppressions: &'a Suppressions,
    rule: &'static str,
    severity_override: Option<Severity>,
    pending: Option<usize>,
}

impl<'a> RuleContext<'a> {
    /// Creates a context for one dispatcher pass.
    pub fn new(
        file: &'a FileContext<'a>,
        stream: &'a TokenStream,
        fixer: &'a mut Fixer,
        sink: &'a mut Vec<Violation>,
        suppressions: &'a Suppressions,
    ) -> Self {
        Self {
            file,
            stream,
            fixer,
            sink,
            suppressions,
            rule: "",
            severity_override: None,
            pending: None,
        }
    }

    /// Switches the context to the rule about to be called.
    pub fn enter_rule(&mut self, rule: &'static str, severity_override: Option<Severity>) {
        self.rule = rule;
        self.severity_override = severity_override;
        self.pending = None;
    }

    /// The token stream of this pass.
    #[must_use]
    pub fn stream(&self) -> &'a TokenStream {
        self.stream
    }

    /// The file being analyzed.
    #[must_use]
    pub fn file(&self) -> &'a FileContext<'a> {
        self.file
    }

    /// Name of the rule currently running.
    #[must_use]
    pub fn rule(&self) -> &'static str {
        self.rule
    }

    /// Returns true if the engine runs in fix mode.
    #[must_use]
    pub fn is_fixing(&self) -> bool {
        self.fixer.is_enabled()
    }

    /// Text at `index` including edits already applied in this pass.
    #[must_use]
    pub fn current_content(&self, index: usize) -> Option<&str> {
        self.fixer.current_content(index)
    }

    /// Records a violation anchored at a token, or file-level when `anchor`
    /// is `None`.
    pub fn emit(
        &mut self,
        severity: Severity,
        code: &str,
        message: impl Into<String>,
        anchor: Option<usize>,
    ) -> ViolationId {
        self.record(severity, code, message.into(), anchor, 0, false)
    }

    /// Records a fixable violation and tells the caller whether to go ahead
    /// with the fix.
    ///
    /// Returns `false` in report-only mode and when the violation is
    /// suppressed; the caller must not edit the stream then.
    pub fn emit_fixable(
        &mut self,
        severity: Severity,
        code: &str,
        message: impl Into<String>,
        anchor: Option<usize>,
    ) -> bool {
        self.emit_fixable_at(severity, code, message, anchor, 0)
    }

    /// Like [`RuleContext::emit_fixable`], but locates the violation at byte
    /// `offset` inside the anchor token, which may span several lines.
    pub fn emit_fixable_at(
        &mut self,
        severity: Severity,
        code: &str,
        message: impl Into<String>,
        anchor: Option<usize>,
        offset: usize,
    ) -> bool {
        let id = self.record(severity, code, message.into(), anchor, offset, true);
        self.pending = id.0;
        id.is_recorded() && self.fixer.is_enabled()
    }

    /// Records a non-fixable error.
    pub fn add_error(
        &mut self,
        code: &str,
        message: impl Into<String>,
        anchor: Option<usize>,
    ) -> ViolationId {
        self.emit(Severity::Error, code, message, anchor)
    }

    /// Records a non-fixable warning.
    pub fn add_warning(
        &mut self,
        code: &str,
        message: impl Into<String>,
        anchor: Option<usize>,
    ) -> ViolationId {
        self.emit(Severity::Warning, code, message, anchor)
    }

    /// Records a fixable error. See [`RuleContext::emit_fixable`].
    pub fn add_fixable_error(
        &mut self,
        code: &str,
        message: impl Into<String>,
        anchor: Option<usize>,
    ) -> bool {
        self.emit_fixable(Severity::Error, code, message, anchor)
    }

    /// Records a fixable error inside a token. See
    /// [`RuleContext::emit_fixable_at`].
    pub fn add_fixable_error_at(
        &mut self,
        code: &str,
        message: impl Into<String>,
        anchor: usize,
        offset: usize,
    ) -> bool {
        self.emit_fixable_at(Severity::Error, code, message, Some(anchor), offset)
    }

    /// Records a fixable warning. See [`RuleContext::emit_fixable`].
    pub fn add_fixable_warning(
        &mut self,
        code: &str,
        message: impl Into<String>,
        anchor: Option<usize>,
    ) -> bool {
        self.emit_fixable(Severity::Warning, code, message, anchor)
    }

    /// Builds the violation and pushes it, unless suppressed. `offset` is a
    /// byte offset into the anchor token's text.
    fn record(
        &mut self,
        severity: Severity,
        code: &str,
        message: String,
        anchor: Option<usize>,
        offset: usize,
        fixable: bool,
    ) -> ViolationId {
        let stream = self.stream;
        let position = anchor
            .and_then(|i| stream.get(i))
            .map(|t| position_within(t, offset));
        let line = position.map(|(line, _, _)| line);
        if self.suppressions.is_suppressed(self.rule, line) {
            tracing::trace!(rule = self.rule, code, ?line, "violation suppressed");
            return ViolationId(None);
        }

        let file = self.file.relative_path.clone();
        let location = match position {
            Some((line, column, length)) => Location::new(file, line, column)
                .with_span(self.file.offset_for(line, column), length),
            None => Location::file_level(file),
        };
        let severity = self.severity_override.unwrap_or(severity);
        let violation =
            Violation::new(self.rule, code, severity, location, message).with_fixable(fixable);
        self.sink.push(violation);
        ViolationId(Some(self.sink.len() - 1))
    }

    /// Opens an empty changeset.
    pub fn begin_changeset(&self) -> Changeset {
        self.fixer.begin_changeset()
    }

    /// Applies a changeset for the pending fixable violation.
    ///
    /// Returns `true` if the edits landed. A rejected changeset leaves the
    /// violation reported but unfixed.
    pub fn end_changeset(&mut self, changeset: Changeset) -> bool {
        match self.fixer.end_changeset(changeset) {
            Ok(_) => {
                if let Some(v) = self.pending.and_then(|i| self.sink.get_mut(i)) {
                    v.fixed = true;
                }
                true
            }
            Err(_) => false,
        }
    }

    /// Replaces the text of one token.
    pub fn replace_token(&mut self, index: usize, text: impl Into<String>) -> bool {
        let mut cs = self.begin_changeset();
        cs.replace(index, text);
        self.end_changeset(cs)
    }

    /// Inserts text in front of a token.
    pub fn insert_before(&mut self, index: usize, text: impl Into<String>) -> bool {
        let mut cs = self.begin_changeset();
        cs.insert_before(index, text);
        self.end_changeset(cs)
    }

    /// Inserts text behind a token.
    pub fn insert_after(&mut self, index: usize, text: impl Into<String>) -> bool {
        let mut cs = self.begin_changeset();
        cs.insert_after(index, text);
        self.end_changeset(cs)
    }

    /// Removes the text of one token.
    pub fn remove_token(&mut self, index: usize) -> bool {
        let mut cs = self.begin_changeset();
        cs.remove(index);
        self.end_changeset(cs)
    }

    /// Inserts a line break in front of a token.
    pub fn add_newline_before(&mut self, index: usize) -> bool {
        self.insert_before(index, "\n")
    }
}
