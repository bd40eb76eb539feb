//! Rule to forbid whitespace after unary `+` and `-`.
//!
//! An operator is unary when the token before it cannot end an operand,
//! e.g. `return - 1;` or `$a = [- 1];`.

use sniff_lint_core::{Rule, RuleContext, RuleError, Scan, TokenKind};

/// Rule code for unary-operator-spacing.
pub const CODE: &str = "SL004";

/// Rule name for unary-operator-spacing.
pub const NAME: &str = "unary-operator-spacing";

/// Token kinds that end an operand, making a following `+`/`-` binary.
const OPERAND_ENDS: &[TokenKind] = &[
    TokenKind::Number,
    TokenKind::String,
    TokenKind::Variable,
    TokenKind::Name,
    TokenKind::CloseParen,
    TokenKind::CloseCurly,
    TokenKind::CloseSquare,
    TokenKind::CloseShortArray,
];

/// `- 1` must be written `-1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnaryOperatorSpacing;

impl UnaryOperatorSpacing {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for UnaryOperatorSpacing {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "A unary plus or minus must not be followed by whitespace"
    }

    fn interests(&self) -> &'static [TokenKind] {
        &[TokenKind::Plus, TokenKind::Minus]
    }

    fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
        let stream = ctx.stream();
        let binary = position
            .checked_sub(1)
            .and_then(|before| stream.prev_significant(before, 0))
            .is_some_and(|prev| OPERAND_ENDS.contains(&stream.kind(prev)));
        let next = position + 1;
        if binary || stream.kind(next) != TokenKind::Whitespace {
            return Ok(Scan::Continue);
        }

        if ctx.add_fixable_error(
            "ArithmeticUnary",
            "An arithmetic unary operator statement must not be followed by a space",
            Some(position),
        ) {
            ctx.remove_token(next);
        }
        Ok(Scan::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{check, codes, fix, fixed_text};

    #[test]
    fn test_detects_unary_minus() {
        let violations = check(UnaryOperatorSpacing, "return - 1;");
        assert_eq!(codes(&violations), vec!["ArithmeticUnary"]);
    }

    #[test]
    fn test_binary_operators_are_allowed() {
        let source = "$a = $b - 1 + foo() - $c[0] - 'x' + 2;";
        assert!(check(UnaryOperatorSpacing, source).is_empty());
    }

    #[test]
    fn test_fix() {
        let source = "$a = [- 1, + $b];";
        let outcome = fix(UnaryOperatorSpacing, source);
        assert_eq!(outcome.violations.len(), 2);
        assert_eq!(fixed_text(&outcome, source), "$a = [-1, +$b];");
    }
}
