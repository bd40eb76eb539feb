//! Rule requiring a file to end with exactly one line break.
//!
//! The violation is file-level: it carries no line or column.

use sniff_lint_core::{Rule, RuleContext, RuleError, Scan, TokenKind};

/// Rule code for end-of-file-newline.
pub const CODE: &str = "SL009";

/// Rule name for end-of-file-newline.
pub const NAME: &str = "end-of-file-newline";

/// Exactly one `\n` after the last code token.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndOfFileNewline;

impl EndOfFileNewline {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for EndOfFileNewline {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Files must end with a single newline"
    }

    fn interests(&self) -> &'static [TokenKind] {
        &[TokenKind::Eof]
    }

    fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
        let stream = ctx.stream();
        let Some(last) = position
            .checked_sub(1)
            .and_then(|before| stream.prev_non_whitespace(before, 0))
        else {
            return Ok(Scan::Continue);
        };
        // Templates and files closed with `?>` manage their own ending.
        if matches!(stream.kind(last), TokenKind::InlineHtml | TokenKind::CloseTag) {
            return Ok(Scan::Continue);
        }

        let trailing = stream.text_between(last + 1, position);
        if trailing == "\n" {
            return Ok(Scan::Continue);
        }

        let found = trailing.matches('\n').count();
        let (code, message) = if found == 0 {
            ("NoneFound", "Expected 1 newline at end of file; 0 found".to_string())
        } else {
            (
                "TooMany",
                format!("Expected 1 newline at end of file; {found} found"),
            )
        };
        if ctx.add_fixable_error(code, message, None) {
            let mut changeset = ctx.begin_changeset();
            for i in last + 1..position {
                changeset.remove(i);
            }
            changeset.insert_after(last, "\n");
            ctx.end_changeset(changeset);
        }
        Ok(Scan::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{check, codes, fix, fixed_text};

    #[test]
    fn test_single_newline_is_clean() {
        assert!(check(EndOfFileNewline, "$a = 1;\n").is_empty());
        assert!(check(EndOfFileNewline, "").is_empty());
    }

    #[test]
    fn test_missing_newline_is_file_level() {
        let violations = check(EndOfFileNewline, "$a = 1;");
        assert_eq!(codes(&violations), vec!["NoneFound"]);
        assert!(violations[0].location.is_file_level());
        assert_eq!(violations[0].location.line, None);
    }

    #[test]
    fn test_fix_trims_extra_lines() {
        let source = "$a = 1;\n\n  \n";
        let outcome = fix(EndOfFileNewline, source);
        assert_eq!(codes(&outcome.violations), vec!["TooMany"]);
        assert_eq!(outcome.violations[0].message, "Expected 1 newline at end of file; 3 found");
        assert_eq!(fixed_text(&outcome, source), "$a = 1;\n");
    }

    #[test]
    fn test_close_tag_is_ignored() {
        assert!(check(EndOfFileNewline, "$a = 1; ?>").is_empty());
    }
}
