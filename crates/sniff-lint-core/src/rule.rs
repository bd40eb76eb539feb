//! Rule traits for defining lint rules.

use crate::context::RuleContext;
use crate::token::TokenKind;
use crate::types::Severity;

/// Where the dispatcher resumes a rule after it processed a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// Keep feeding the rule every interesting token.
    Continue,
    /// Do not call the rule again for tokens before this index.
    SkipTo(usize),
}

/// Error returned by a rule that gave up on one construct.
///
/// The dispatcher logs it and moves on; it never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The construct at `position` is structurally broken, e.g. an opener
    /// without a matching closer.
    #[error("malformed input at token {position}: {reason}")]
    Malformed {
        /// Stream index where analysis stopped.
        position: usize,
        /// What was wrong.
        reason: String,
    },
}

impl RuleError {
    /// Creates a [`RuleError::Malformed`].
    #[must_use]
    pub fn malformed(position: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            reason: reason.into(),
        }
    }
}

/// A token-driven lint rule.
///
/// The dispatcher calls [`Rule::process`] for every token whose kind is in
/// [`Rule::interests`]. Rules read the stream through the context, emit
/// violations through it and, when a fixable violation is approved, queue
/// edits through it.
///
/// # Example
///
/// ```ignore
/// use sniff_lint_core::{Rule, RuleContext, RuleError, Scan, TokenKind};
///
/// pub struct NoShortTags;
///
/// impl Rule for NoShortTags {
///     fn name(&self) -> &'static str { "no-short-tags" }
///     fn code(&self) -> &'static str { "SL100" }
///     fn interests(&self) -> &'static [TokenKind] { &[TokenKind::OpenTag] }
///
///     fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
///         if ctx.stream()[position].text == "<?" && ctx.add_fixable_error(
///             "Found", "Short open tag used", Some(position),
///         ) {
///             ctx.replace_token(position, "<?php");
///         }
///         Ok(Scan::Continue)
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "array-declaration").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "SL001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Token kinds this rule wants to be called for.
    fn interests(&self) -> &'static [TokenKind];

    /// Processes the token at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Malformed`] when the construct cannot be analyzed.
    fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRule;

    impl Rule for TestRule {
        fn name(&self) -> &'static str {
            "test-rule"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn description(&self) -> &'static str {
            "A test rule"
        }
        fn interests(&self) -> &'static [TokenKind] {
            &[TokenKind::Comma]
        }
        fn process(&self, _ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
            Err(RuleError::malformed(position, "always"))
        }
    }

    #[test]
    fn test_rule_trait() {
        let rule = TestRule;
        assert_eq!(rule.name(), "test-rule");
        assert_eq!(rule.code(), "TEST001");
        assert_eq!(rule.default_severity(), Severity::Error);
        assert_eq!(rule.interests(), &[TokenKind::Comma]);
    }

    #[test]
    fn test_malformed_message() {
        let err = RuleError::malformed(7, "opener has no closer");
        assert_eq!(err.to_string(), "malformed input at token 7: opener has no closer");
    }
}
