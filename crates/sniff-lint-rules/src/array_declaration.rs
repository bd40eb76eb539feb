//! Rule enforcing the layout of array declarations.
//!
//! # Rationale
//!
//! Consistently laid out arrays are easier to scan and produce smaller
//! diffs. Multi-line arrays get one entry per line, keys aligned on the
//! indentation column, double arrows aligned one space after the longest
//! key and a trailing comma after the last entry.
//!
//! # Detected Patterns
//!
//! - `ARRAY(...)` or `array (...)` keyword spelling and spacing
//! - Whitespace inside `[]` / `array()`
//! - Single-line arrays: a trailing comma, spacing around `=>` and `,`
//! - Multi-line arrays: closing bracket placement, entries sharing a line,
//!   misaligned keys, arrows and values, a missing trailing comma
//! - Arrays mixing keyed and unkeyed entries
//!
//! # Configuration
//!
//! - `indent`: indentation width of entries relative to the line holding
//!   the opening bracket (default 4)
//! - `ignore_new_lines`: accept `=>` or values placed on the line after
//!   their key (default true)
//!
//! # Example
//!
//! ```php
//! $a = [
//!     'short'    => 1,
//!     'much-longer' => 2,   // arrow not aligned
//! ];
//! ```

mod layout;

use layout::{KeyMismatch, Layout, Literal};
use sniff_lint_core::utils::text::spaces;
use sniff_lint_core::{Rule, RuleConfig, RuleContext, RuleError, Scan, TokenKind, TokenStream};

/// Rule code for array-declaration.
pub const CODE: &str = "SL001";

/// Rule name for array-declaration.
pub const NAME: &str = "array-declaration";

/// Default entry indentation width.
pub const DEFAULT_INDENT: usize = 4;

/// Checks spacing, commas and alignment of array literals.
#[derive(Debug, Clone)]
pub struct ArrayDeclaration {
    /// Indentation width of entries.
    pub indent: usize,
    /// Whether `=>` or values on their own line are accepted.
    pub ignore_new_lines: bool,
}

impl Default for ArrayDeclaration {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayDeclaration {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            ignore_new_lines: true,
        }
    }

    /// Applies the options of a `[rules.array-declaration]` block over the
    /// current settings.
    #[must_use]
    pub fn configure(self, config: &RuleConfig) -> Self {
        let indent = config.get_usize("indent", self.indent);
        let ignore_new_lines = config.get_bool("ignore_new_lines", self.ignore_new_lines);
        self.indent(indent).ignore_new_lines(ignore_new_lines)
    }

    /// Sets the entry indentation width.
    #[must_use]
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets whether arrows and values may start a new line.
    #[must_use]
    pub fn ignore_new_lines(mut self, ignore: bool) -> Self {
        self.ignore_new_lines = ignore;
        self
    }

    /// Resolves the brackets of an `array(...)` literal and checks the
    /// keyword itself. `None` when the keyword is not a literal.
    fn keyword_literal(
        ctx: &mut RuleContext<'_>,
        position: usize,
    ) -> Result<Option<Literal>, RuleError> {
        let stream = ctx.stream();
        let member_access = position
            .checked_sub(1)
            .and_then(|before| stream.prev_significant(before, 0))
            .is_some_and(|prev| matches!(stream[prev].text.as_str(), "->" | "?->" | "::"));
        if member_access {
            return Ok(None);
        }
        let Some(opener) = stream.next_significant(position + 1, None) else {
            return Ok(None);
        };
        if stream.kind(opener) != TokenKind::OpenParen {
            return Ok(None);
        }
        let closer = stream
            .partner(opener)
            .ok_or_else(|| RuleError::malformed(opener, "array( without closing parenthesis"))?;

        let keyword = stream[position].text.as_str();
        if keyword != "array"
            && ctx.add_fixable_error(
                "NotLowerCase",
                format!("Array keyword should be lower case; expected \"array\" but found \"{keyword}\""),
                Some(position),
            )
        {
            ctx.replace_token(position, "array");
        }

        if opener != position + 1
            && ctx.add_fixable_error(
                "SpaceAfterKeyword",
                "There must be no space between the \"array\" keyword and the opening parenthesis",
                Some(position),
            )
        {
            let mut changeset = ctx.begin_changeset();
            for i in position + 1..opener {
                changeset.remove(i);
            }
            ctx.end_changeset(changeset);
        }

        Ok(Some(Literal {
            start: position,
            opener,
            closer,
        }))
    }

    /// Returns true if the literal has no entries.
    fn check_empty(ctx: &mut RuleContext<'_>, literal: Literal) -> bool {
        let stream = ctx.stream();
        if stream.next_non_whitespace(literal.opener + 1, None) != Some(literal.closer) {
            return false;
        }
        if literal.closer - literal.opener != 1
            && ctx.add_fixable_error(
                "SpaceInEmptyArray",
                "Empty array declaration must have no space between the parentheses",
                Some(literal.start),
            )
        {
            let mut changeset = ctx.begin_changeset();
            for i in literal.opener + 1..literal.closer {
                changeset.remove(i);
            }
            ctx.end_changeset(changeset);
        }
        true
    }

    fn check_single_line(ctx: &mut RuleContext<'_>, literal: Literal, layout: &Layout) {
        let stream = ctx.stream();
        let mut separators = Vec::with_capacity(layout.commas.len());
        for &comma in &layout.commas {
            if stream
                .next_non_whitespace(comma + 1, Some(literal.closer))
                .is_some()
            {
                separators.push(comma);
            } else if ctx.add_fixable_error(
                "CommaAfterLast",
                "Comma not allowed after last value in single-line array declaration",
                Some(comma),
            ) {
                ctx.remove_token(comma);
            }
        }

        for &arrow in &layout.arrows {
            check_arrow_spacing(ctx, arrow);
        }
        for comma in separators {
            check_comma_spacing(ctx, comma);
        }
        report_key_mismatches(ctx, layout);
    }

    fn check_multi_line(&self, ctx: &mut RuleContext<'_>, literal: Literal, layout: &Layout) {
        let stream = ctx.stream();
        let base_indent = stream.line_indent(literal.start);

        check_closer(ctx, literal, base_indent);
        report_key_mismatches(ctx, layout);
        check_comma_placement(ctx, layout);

        if let Some(last) = layout.entries.last() {
            if last.comma.is_none() && last.value.is_some() {
                if let Some(trailing) = stream.prev_significant(literal.closer - 1, literal.opener)
                {
                    if ctx.add_fixable_error(
                        "NoCommaAfterLast",
                        "Comma required after last value in array declaration",
                        Some(trailing),
                    ) {
                        ctx.insert_after(trailing, ",");
                    }
                }
            }
        }

        self.check_bare_values(ctx, layout, base_indent);
        self.check_alignment(ctx, literal, layout, base_indent);
    }

    fn check_bare_values(&self, ctx: &mut RuleContext<'_>, layout: &Layout, base_indent: usize) {
        let stream = ctx.stream();
        for (n, entry) in layout.entries.iter().enumerate() {
            if entry.is_keyed() {
                continue;
            }
            let Some(value) = entry.value else {
                continue;
            };

            let shares_line = layout
                .previous_comma(n)
                .is_some_and(|comma| stream[comma].line == stream[value].line);
            if shares_line {
                if ctx.add_fixable_error(
                    "ValueNoNewline",
                    "Each value in a multi-line array must be on a new line",
                    Some(value),
                ) {
                    break_line_before(ctx, value);
                }
            } else if stream.is_first_on_line(value) {
                let expected = base_indent + self.indent;
                let found = stream[value].column - 1;
                if found != expected {
                    reindent(
                        ctx,
                        "ValueNotAligned",
                        format!("Array value not aligned correctly; expected {expected} spaces but found {found}"),
                        value,
                        expected,
                    );
                }
            }
        }
    }

    fn check_alignment(
        &self,
        ctx: &mut RuleContext<'_>,
        literal: Literal,
        layout: &Layout,
        base_indent: usize,
    ) {
        let stream = ctx.stream();
        let start_line = stream[literal.start].line;
        let indices_start = base_indent + self.indent + 1;
        let arrow_start = indices_start + layout.max_key_width + 1;
        let value_start = arrow_start + 3;

        for (n, entry) in layout.entries.iter().enumerate() {
            let Some(arrow) = entry.arrow else {
                // A single value may share the opening line.
                if n == 0 && layout.entries.len() > 1 {
                    if let Some(value) = entry.value {
                        if stream[value].line == start_line
                            && ctx.add_fixable_error(
                                "FirstValueNoNewline",
                                "The first value in a multi-value array must be on a new line",
                                Some(literal.start),
                            )
                        {
                            break_line_before(ctx, value);
                        }
                    }
                }
                continue;
            };
            let Some(key) = entry.key else {
                continue;
            };

            if stream[key.start].line == start_line {
                if ctx.add_fixable_error(
                    "FirstIndexNoNewline",
                    "The first index in a multi-value array must be on a new line",
                    Some(key.start),
                ) {
                    break_line_before(ctx, key.start);
                }
                continue;
            }

            let shares_line = layout
                .previous_comma(n)
                .is_some_and(|comma| stream[comma].line == stream[key.start].line);
            if shares_line {
                if ctx.add_fixable_error(
                    "IndexNoNewline",
                    "Each index in a multi-line array must be on a new line",
                    Some(key.start),
                ) {
                    break_line_before(ctx, key.start);
                }
                continue;
            }

            let key_column = stream[key.start].column;
            if key_column != indices_start {
                let expected = indices_start - 1;
                reindent(
                    ctx,
                    "KeyNotAligned",
                    format!(
                        "Array key not aligned correctly; expected {expected} spaces but found {}",
                        key_column - 1
                    ),
                    key.start,
                    expected,
                );
                continue;
            }

            let key_end_column = key_column + key.width;
            let arrow_on_key_line = stream[arrow].line == stream[key.end].line;
            if !arrow_on_key_line || stream[arrow].column != arrow_start {
                let expected = arrow_start.saturating_sub(key_end_column);
                let found = if arrow_on_key_line {
                    stream[arrow].column.saturating_sub(key_end_column).to_string()
                } else if self.ignore_new_lines {
                    continue;
                } else {
                    "newline".to_string()
                };
                realign(
                    ctx,
                    "DoubleArrowNotAligned",
                    format!("Array double arrow not aligned correctly; expected {expected} space(s) but found {found}"),
                    arrow,
                    (key.end, arrow),
                    expected,
                );
                continue;
            }

            let Some(value) = entry.value else {
                continue;
            };
            let arrow_end_column = stream[arrow].column + stream[arrow].length;
            let value_on_arrow_line = stream[value].line == stream[arrow].line;
            if !value_on_arrow_line || stream[value].column != value_start {
                let expected = value_start.saturating_sub(arrow_end_column);
                let found = if value_on_arrow_line {
                    stream[value]
                        .column
                        .saturating_sub(arrow_end_column)
                        .to_string()
                } else if self.ignore_new_lines {
                    continue;
                } else {
                    "newline".to_string()
                };
                realign(
                    ctx,
                    "ValueNotAligned",
                    format!("Array value not aligned correctly; expected {expected} space(s) but found {found}"),
                    arrow,
                    (arrow, value),
                    expected,
                );
            }
        }
    }
}

impl Rule for ArrayDeclaration {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Enforces spacing, trailing commas and alignment in array declarations"
    }

    fn interests(&self) -> &'static [TokenKind] {
        &[TokenKind::Array, TokenKind::OpenShortArray]
    }

    fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
        let stream = ctx.stream();
        let literal = if stream.kind(position) == TokenKind::Array {
            match Self::keyword_literal(ctx, position)? {
                Some(literal) => literal,
                None => return Ok(Scan::Continue),
            }
        } else {
            let closer = stream.partner(position).ok_or_else(|| {
                RuleError::malformed(position, "short array without closing bracket")
            })?;
            Literal {
                start: position,
                opener: position,
                closer,
            }
        };

        if Self::check_empty(ctx, literal) {
            return Ok(Scan::Continue);
        }

        let layout = Layout::scan(stream, literal);
        if literal.is_single_line(stream) {
            Self::check_single_line(ctx, literal, &layout);
        } else {
            self.check_multi_line(ctx, literal, &layout);
        }

        // Nested literals are visited on their own.
        Ok(Scan::Continue)
    }
}

fn check_arrow_spacing(ctx: &mut RuleContext<'_>, arrow: usize) {
    let stream = ctx.stream();

    let before = arrow - 1;
    if stream.kind(before) != TokenKind::Whitespace {
        let content = &stream[before].text;
        if ctx.add_fixable_error(
            "NoSpaceBeforeDoubleArrow",
            format!("Expected 1 space between \"{content}\" and double arrow; 0 found"),
            Some(arrow),
        ) {
            ctx.insert_before(arrow, " ");
        }
    } else if stream[before].length != 1 {
        let content = &stream[before - 1].text;
        let found = stream[before].length;
        if ctx.add_fixable_error(
            "SpaceBeforeDoubleArrow",
            format!("Expected 1 space between \"{content}\" and double arrow; {found} found"),
            Some(arrow),
        ) {
            ctx.replace_token(before, " ");
        }
    }

    let after = arrow + 1;
    if stream.kind(after) != TokenKind::Whitespace {
        let content = &stream[after].text;
        if ctx.add_fixable_error(
            "NoSpaceAfterDoubleArrow",
            format!("Expected 1 space between double arrow and \"{content}\"; 0 found"),
            Some(arrow),
        ) {
            ctx.insert_after(arrow, " ");
        }
    } else if stream[after].length != 1 {
        let content = stream.get(after + 1).map_or("", |t| t.text.as_str());
        let found = stream[after].length;
        if ctx.add_fixable_error(
            "SpaceAfterDoubleArrow",
            format!("Expected 1 space between double arrow and \"{content}\"; {found} found"),
            Some(arrow),
        ) {
            ctx.replace_token(after, " ");
        }
    }
}

fn check_comma_spacing(ctx: &mut RuleContext<'_>, comma: usize) {
    let stream = ctx.stream();

    let after = comma + 1;
    if stream.kind(after) != TokenKind::Whitespace {
        let content = &stream[after].text;
        if ctx.add_fixable_error(
            "NoSpaceAfterComma",
            format!("Expected 1 space between comma and \"{content}\"; 0 found"),
            Some(comma),
        ) {
            ctx.insert_after(comma, " ");
        }
    } else if stream[after].length != 1 {
        let content = stream.get(after + 1).map_or("", |t| t.text.as_str());
        let found = stream[after].length;
        if ctx.add_fixable_error(
            "SpaceAfterComma",
            format!("Expected 1 space between comma and \"{content}\"; {found} found"),
            Some(comma),
        ) {
            ctx.replace_token(after, " ");
        }
    }

    let before = comma - 1;
    if stream.kind(before) == TokenKind::Whitespace {
        let content = before
            .checked_sub(1)
            .map_or("", |i| stream[i].text.as_str());
        let found = stream[before].length;
        if ctx.add_fixable_error(
            "SpaceBeforeComma",
            format!("Expected 0 spaces between \"{content}\" and comma; {found} found"),
            Some(comma),
        ) {
            ctx.remove_token(before);
        }
    }
}

/// Whitespace (including line breaks) between an entry and its comma.
fn check_comma_placement(ctx: &mut RuleContext<'_>, layout: &Layout) {
    let stream = ctx.stream();
    for &comma in &layout.commas {
        if !stream.kind(comma - 1).is_whitespace() {
            continue;
        }
        let Some(content) = stream.prev_non_whitespace(comma - 1, 0) else {
            continue;
        };
        // Pulling the comma up would comment it out.
        if is_line_comment(stream, content) {
            continue;
        }

        let gap = content + 1..comma;
        let found = if gap.clone().any(|i| stream.kind(i) == TokenKind::Newline) {
            "newline".to_string()
        } else {
            gap.clone().map(|i| stream[i].length).sum::<usize>().to_string()
        };
        if ctx.add_fixable_error(
            "SpaceBeforeComma",
            format!(
                "Expected 0 spaces between \"{}\" and comma; {found} found",
                stream[content].text
            ),
            Some(comma),
        ) {
            let mut changeset = ctx.begin_changeset();
            for i in gap {
                changeset.remove(i);
            }
            ctx.end_changeset(changeset);
        }
    }
}

fn check_closer(ctx: &mut RuleContext<'_>, literal: Literal, base_indent: usize) {
    let stream = ctx.stream();
    let Some(last_content) = stream.prev_non_whitespace(literal.closer - 1, literal.opener) else {
        return;
    };

    if stream[last_content].line == stream[literal.closer].line {
        if ctx.add_fixable_error(
            "CloseBraceNewLine",
            "Closing parenthesis of array declaration must be on a new line",
            Some(literal.closer),
        ) {
            break_line_before(ctx, literal.closer);
        }
        return;
    }

    let found = stream[literal.closer].column - 1;
    if found != base_indent {
        reindent(
            ctx,
            "CloseBraceNotAligned",
            format!("Closing parenthesis not aligned correctly; expected {base_indent} space(s) but found {found}"),
            literal.closer,
            base_indent,
        );
    }
}

fn report_key_mismatches(ctx: &mut RuleContext<'_>, layout: &Layout) {
    for mismatch in &layout.mismatches {
        match *mismatch {
            KeyMismatch::KeySpecified(arrow) => ctx.add_error(
                "KeySpecified",
                "Key specified for array entry; first entry has no key",
                Some(arrow),
            ),
            KeyMismatch::NoKeySpecified(separator) => ctx.add_error(
                "NoKeySpecified",
                "No key specified for array entry; first entry specifies key",
                Some(separator),
            ),
        };
    }
}

fn is_line_comment(stream: &TokenStream, index: usize) -> bool {
    stream.kind(index) == TokenKind::Comment
        && (stream[index].text.starts_with("//") || stream[index].text.starts_with('#'))
}

/// Moves the token at `index` to a line of its own, dropping the spaces
/// in front of it.
fn break_line_before(ctx: &mut RuleContext<'_>, index: usize) {
    let stream = ctx.stream();
    let mut changeset = ctx.begin_changeset();
    let mut i = index;
    while i > 0 && stream.kind(i - 1) == TokenKind::Whitespace {
        i -= 1;
        changeset.remove(i);
    }
    changeset.insert_before(index, "\n");
    ctx.end_changeset(changeset);
}

/// Reports a token that starts a line at the wrong column. Only fixable
/// when nothing but indentation precedes it.
fn reindent(ctx: &mut RuleContext<'_>, code: &str, message: String, index: usize, width: usize) {
    let stream = ctx.stream();
    if !stream.is_first_on_line(index) {
        ctx.add_error(code, message, Some(index));
        return;
    }
    if ctx.add_fixable_error(code, message, Some(index)) {
        if stream.kind(index - 1) == TokenKind::Whitespace {
            ctx.replace_token(index - 1, spaces(width));
        } else {
            ctx.insert_before(index, spaces(width));
        }
    }
}

/// Reports a gap of the wrong width between two tokens and replaces it
/// with `width` spaces. Gaps holding comments are not touched.
fn realign(
    ctx: &mut RuleContext<'_>,
    code: &str,
    message: String,
    anchor: usize,
    (from, to): (usize, usize),
    width: usize,
) {
    let stream = ctx.stream();
    let gap = from + 1..to;
    if !gap.clone().all(|i| stream.kind(i).is_whitespace()) {
        ctx.add_error(code, message, Some(anchor));
        return;
    }
    if ctx.add_fixable_error(code, message, Some(anchor)) {
        let mut changeset = ctx.begin_changeset();
        if gap.is_empty() {
            changeset.insert_before(to, spaces(width));
        } else {
            changeset.replace(gap.start, spaces(width));
            for i in gap.start + 1..gap.end {
                changeset.remove(i);
            }
        }
        ctx.end_changeset(changeset);
    }
}
