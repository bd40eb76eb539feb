//! Rule to forbid whitespace after the `!` operator.

use sniff_lint_core::{Rule, RuleContext, RuleError, Scan, TokenKind};

/// Rule code for boolean-not-spacing.
pub const CODE: &str = "SL003";

/// Rule name for boolean-not-spacing.
pub const NAME: &str = "boolean-not-spacing";

/// `! $a` must be written `!$a`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanNotSpacing;

impl BooleanNotSpacing {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for BooleanNotSpacing {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "A not operator must not be followed by whitespace"
    }

    fn interests(&self) -> &'static [TokenKind] {
        &[TokenKind::BooleanNot]
    }

    fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
        let next = position + 1;
        if !ctx.stream().kind(next).is_whitespace() {
            return Ok(Scan::Continue);
        }
        if ctx.add_fixable_error(
            "BooleanNot",
            "A not operator statement must not be followed by a space",
            Some(position),
        ) {
            ctx.remove_token(next);
        }
        Ok(Scan::Continue)
    }
}
