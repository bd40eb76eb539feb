//! Comment-based suppression directives.
//!
//! Supports directives like:
//! ```text
//! // sniff-lint: allow(array-declaration) reason="generated table"
//! # sniff-lint: allow(all)
//! ```
//!
//! A directive suppresses matching violations on its own line and on the
//! line directly below it.

use crate::token::{TokenKind, TokenStream};
use std::collections::{HashMap, HashSet};

/// Parsed suppression directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowDirective {
    /// Rule names that are allowed; `all` matches every rule.
    pub rules: HashSet<String>,
    /// Optional reason for the suppression.
    pub reason: Option<String>,
}

impl AllowDirective {
    /// Returns true if the directive covers `rule`.
    #[must_use]
    pub fn covers(&self, rule: &str) -> bool {
        self.rules.contains(rule) || self.rules.contains("all")
    }
}

/// Directives collected from one token stream, keyed by line.
#[derive(Debug, Clone, Default)]
pub struct Suppressions {
    by_line: HashMap<usize, AllowDirective>,
}

impl Suppressions {
    /// Collects every directive found in comment tokens.
    #[must_use]
    pub fn from_stream(stream: &TokenStream) -> Self {
        let by_line = stream
            .iter()
            .filter(|t| t.kind == TokenKind::Comment)
            .filter_map(|t| parse_allow_directive(&t.text).map(|d| (t.line, d)))
            .collect();
        Self { by_line }
    }

    /// Returns true if no directives were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }

    /// Checks whether a violation of `rule` on `line` is suppressed.
    ///
    /// File-level violations (no line) can't be suppressed this way.
    #[must_use]
    pub fn is_suppressed(&self, rule: &str, line: Option<usize>) -> bool {
        let Some(line) = line else {
            return false;
        };
        [Some(line), line.checked_sub(1)]
            .into_iter()
            .flatten()
            .filter_map(|l| self.by_line.get(&l))
            .any(|d| d.covers(rule))
    }
}

/// Parses a suppression directive out of a comment's text.
#[must_use]
pub fn parse_allow_directive(comment: &str) -> Option<AllowDirective> {
    let comment = comment.trim();
    let body = if let Some(rest) = comment.strip_prefix("//") {
        rest
    } else if let Some(rest) = comment.strip_prefix('#') {
        rest
    } else if let Some(rest) = comment.strip_prefix("/*") {
        rest.strip_suffix("*/").unwrap_or(rest)
    } else {
        return None;
    };

    let directive = body.trim().strip_prefix("sniff-lint:")?.trim();
    let allow_content = directive.strip_prefix("allow(")?;
    let paren_end = allow_content.find(')')?;

    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()));

    Some(AllowDirective { rules, reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{PhpTokenizer, Tokenizer};

    #[test]
    fn test_parse_allow_directive() {
        let directive = parse_allow_directive("// sniff-lint: allow(array-declaration)").unwrap();
        assert!(directive.covers("array-declaration"));
        assert!(!directive.covers("valid-class-name"));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_allow_directive_with_reason() {
        let directive = parse_allow_directive(
            "# sniff-lint: allow(boolean-not-spacing, valid-class-name) reason=\"legacy\"",
        )
        .unwrap();
        assert!(directive.covers("valid-class-name"));
        assert_eq!(directive.reason.as_deref(), Some("legacy"));
    }

    #[test]
    fn test_parse_block_comment_and_all() {
        let directive = parse_allow_directive("/* sniff-lint: allow(all) */").unwrap();
        assert!(directive.covers("anything"));
    }

    #[test]
    fn test_rejects_other_comments() {
        assert!(parse_allow_directive("// plain comment").is_none());
        assert!(parse_allow_directive("// sniff-lint: allow()").is_none());
        assert!(parse_allow_directive("// sniff-lint: deny(x)").is_none());
    }

    #[test]
    fn test_suppression_covers_same_and_next_line() {
        let tokens = PhpTokenizer::snippet()
            .tokenize("// sniff-lint: allow(array-declaration)\n$a = [1,];\n$b = [1,];\n")
            .unwrap();
        let suppressions = Suppressions::from_stream(&TokenStream::new(tokens));
        assert!(suppressions.is_suppressed("array-declaration", Some(1)));
        assert!(suppressions.is_suppressed("array-declaration", Some(2)));
        assert!(!suppressions.is_suppressed("array-declaration", Some(3)));
        assert!(!suppressions.is_suppressed("other", Some(2)));
        assert!(!suppressions.is_suppressed("array-declaration", None));
    }
}
