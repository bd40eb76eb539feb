//! Rule requiring exactly one blank line before `namespace`.

use sniff_lint_core::{Rule, RuleContext, RuleError, Scan, Token, TokenKind};

/// Rule code for namespace-declaration.
pub const CODE: &str = "SL007";

/// Rule name for namespace-declaration.
pub const NAME: &str = "namespace-declaration";

/// One blank line between the preceding code and a namespace declaration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceDeclaration;

impl NamespaceDeclaration {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Line on which the text of `token` ends. A trailing line break belongs to
/// the line it terminates.
fn end_line(token: &Token) -> usize {
    let breaks = token.text.trim_end_matches('\n').matches('\n').count();
    token.line + breaks
}

impl Rule for NamespaceDeclaration {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "There must be one blank line before the namespace declaration"
    }

    fn interests(&self) -> &'static [TokenKind] {
        &[TokenKind::Namespace]
    }

    fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
        let stream = ctx.stream();
        let Some(previous) = position
            .checked_sub(1)
            .and_then(|before| stream.prev_non_whitespace(before, 0))
        else {
            return Ok(Scan::Continue);
        };

        let previous_end = end_line(&stream[previous]);
        let blank_lines = stream[position].line.saturating_sub(previous_end + 1);
        let own_line = stream[position].line > previous_end;
        if own_line && blank_lines == 1 {
            return Ok(Scan::Continue);
        }

        if ctx.add_fixable_error(
            "BlankLineBefore",
            "There must be one blank line before the namespace declaration",
            Some(position),
        ) {
            let separator = if stream[previous].text.ends_with('\n') {
                "\n"
            } else {
                "\n\n"
            };
            let mut changeset = ctx.begin_changeset();
            for i in previous + 1..position {
                changeset.remove(i);
            }
            changeset.insert_before(position, separator);
            ctx.end_changeset(changeset);
        }
        Ok(Scan::Continue)
    }
}
