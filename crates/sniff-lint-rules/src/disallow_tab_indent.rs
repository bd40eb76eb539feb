//! Rule to forbid tabs in indentation.
//!
//! # Configuration
//!
//! - `tab_width`: number of spaces each tab is replaced with (default 4)

use sniff_lint_core::utils::text::spaces;
use sniff_lint_core::{Rule, RuleConfig, RuleContext, RuleError, Scan, TokenKind};

/// Rule code for disallow-tab-indent.
pub const CODE: &str = "SL002";

/// Rule name for disallow-tab-indent.
pub const NAME: &str = "disallow-tab-indent";

/// Replaces tab indentation with spaces.
#[derive(Debug, Clone)]
pub struct DisallowTabIndent {
    /// Spaces per tab.
    pub tab_width: usize,
}

impl Default for DisallowTabIndent {
    fn default() -> Self {
        Self::new()
    }
}

impl DisallowTabIndent {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self { tab_width: 4 }
    }

    /// Applies the options of a `[rules.disallow-tab-indent]` block.
    #[must_use]
    pub fn configure(self, config: &RuleConfig) -> Self {
        let width = config.get_usize("tab_width", self.tab_width);
        self.tab_width(width)
    }

    /// Sets the number of spaces per tab.
    #[must_use]
    pub fn tab_width(mut self, width: usize) -> Self {
        self.tab_width = width;
        self
    }
}

impl Rule for DisallowTabIndent {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Indentation must use spaces, not tabs"
    }

    fn interests(&self) -> &'static [TokenKind] {
        &[TokenKind::Whitespace]
    }

    fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
        let token = &ctx.stream()[position];
        if token.column != 1 || !token.text.contains('\t') {
            return Ok(Scan::Continue);
        }

        if ctx.add_fixable_error(
            "TabsUsed",
            "Indentation using tabs is not allowed; use spaces instead",
            Some(position),
        ) {
            let replaced = token.text.replace('\t', &spaces(self.tab_width));
            ctx.replace_token(position, replaced);
        }
        Ok(Scan::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{check, fix, fixed_text};

    #[test]
    fn test_detects_tab_indent() {
        let violations = check(DisallowTabIndent::new(), "if ($a) {\n\t$b = 1;\n}");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, Some(2));
        assert_eq!(violations[0].code, "TabsUsed");
    }

    #[test]
    fn test_allows_tabs_after_code() {
        assert!(check(DisallowTabIndent::new(), "$a\t= 1;").is_empty());
    }

    #[test]
    fn test_fix_uses_tab_width() {
        let source = "{\n\t \t$b;\n}";
        let outcome = fix(DisallowTabIndent::new().tab_width(2), source);
        assert_eq!(fixed_text(&outcome, source), "{\n     $b;\n}");
    }
}
