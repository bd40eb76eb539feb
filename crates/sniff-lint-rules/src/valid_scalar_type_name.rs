//! Rule enforcing short scalar type names in casts and doc comments.
//!
//! `(integer) $a` becomes `(int) $a`, and `@param boolean $flag` becomes
//! `@param bool $flag`. Union and nullable types are checked part by part.

use sniff_lint_core::{Rule, RuleContext, RuleError, Scan, TokenKind};

/// Rule code for valid-scalar-type-name.
pub const CODE: &str = "SL006";

/// Rule name for valid-scalar-type-name.
pub const NAME: &str = "valid-scalar-type-name";

/// Long type names and their short replacements.
const TYPES: &[(&str, &str)] = &[
    ("boolean", "bool"),
    ("double", "float"),
    ("integer", "int"),
    ("real", "float"),
];

/// Doc tags whose first word is a type.
const TYPED_TAGS: &[&str] = &["@param", "@return", "@var"];

/// Requires `bool`/`int`/`float` over their long aliases.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidScalarTypeName;

impl ValidScalarTypeName {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn short_type(name: &str) -> Option<&'static str> {
    TYPES
        .iter()
        .find(|(long, _)| name.eq_ignore_ascii_case(long))
        .map(|&(_, short)| short)
}

/// A long type name found inside a token's text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Misnamed {
    offset: usize,
    found: String,
    valid: &'static str,
}

/// Type name inside a cast like `( integer )`.
fn scan_cast(text: &str) -> Option<Misnamed> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let name = inner.trim_matches([' ', '\t']);
    let valid = short_type(name)?;
    let offset = text.find(name)?;
    Some(Misnamed {
        offset,
        found: name.to_string(),
        valid,
    })
}

/// Type names following `@param`, `@return` and `@var` in a doc comment.
fn scan_doc_comment(text: &str) -> Vec<Misnamed> {
    let mut found = Vec::new();
    for tag in TYPED_TAGS {
        let mut from = 0;
        while let Some(at) = text[from..].find(tag) {
            let tag_end = from + at + tag.len();
            from = tag_end;
            let rest = &text[tag_end..];
            // `@parameter` is not `@param`.
            if !rest.starts_with([' ', '\t']) {
                continue;
            }
            let type_start = tag_end + (rest.len() - rest.trim_start_matches([' ', '\t']).len());
            let word_len = text[type_start..]
                .find(char::is_whitespace)
                .unwrap_or(text.len() - type_start);
            let word = &text[type_start..type_start + word_len];

            let mut part_start = type_start;
            for part in word.split('|') {
                let base = part.trim_start_matches('?').trim_end_matches("[]");
                if let Some(valid) = short_type(base) {
                    let lead = part.len() - part.trim_start_matches('?').len();
                    found.push(Misnamed {
                        offset: part_start + lead,
                        found: base.to_string(),
                        valid,
                    });
                }
                part_start += part.len() + 1;
            }
        }
    }
    found.sort_by_key(|m| m.offset);
    found
}

impl Rule for ValidScalarTypeName {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Casts and doc types use bool, int and float"
    }

    fn interests(&self) -> &'static [TokenKind] {
        &[TokenKind::Cast, TokenKind::DocComment]
    }

    fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
        let text = &ctx.stream()[position].text;
        let found = if ctx.stream().kind(position) == TokenKind::Cast {
            scan_cast(text).into_iter().collect()
        } else {
            scan_doc_comment(text)
        };

        for misnamed in found {
            if ctx.add_fixable_error_at(
                "InvalidType",
                format!(
                    "For type-hinting in PHPDocs and casting, use {} instead of {}",
                    misnamed.valid, misnamed.found
                ),
                position,
                misnamed.offset,
            ) {
                let end = misnamed.offset + misnamed.found.len();
                let fixed = format!("{}{}{}", &text[..misnamed.offset], misnamed.valid, &text[end..]);
                ctx.replace_token(position, fixed);
            }
        }
        Ok(Scan::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{check, fix, fixed_text};

    #[test]
    fn test_scan_cast() {
        let m = scan_cast("( Integer )").unwrap();
        assert_eq!(m.offset, 2);
        assert_eq!(m.found, "Integer");
        assert_eq!(m.valid, "int");
        assert!(scan_cast("(int)").is_none());
    }

    #[test]
    fn test_scan_doc_comment() {
        let doc = "/**\n * @param ?boolean|real[] $a\n * @parameter double\n * @return integer\n */";
        let found: Vec<_> = scan_doc_comment(doc)
            .into_iter()
            .map(|m| (m.found, m.valid))
            .collect();
        assert_eq!(
            found,
            vec![
                ("boolean".to_string(), "bool"),
                ("real".to_string(), "float"),
                ("integer".to_string(), "int"),
            ]
        );
    }

    #[test]
    fn test_cast_message_and_fix() {
        let source = "$a = (boolean) $b;";
        let violations = check(ValidScalarTypeName, source);
        assert_eq!(
            violations[0].message,
            "For type-hinting in PHPDocs and casting, use bool instead of boolean"
        );
        let outcome = fix(ValidScalarTypeName, source);
        assert_eq!(fixed_text(&outcome, source), "$a = (bool) $b;");
    }

    #[test]
    fn test_doc_comment_fix_takes_several_passes() {
        let source = "/**\n * @param integer $a\n * @return double\n */\nfunction f($a) {}";
        let outcome = fix(ValidScalarTypeName, source);
        assert!(outcome.converged);
        assert_eq!(
            fixed_text(&outcome, source),
            "/**\n * @param int $a\n * @return float\n */\nfunction f($a) {}"
        );
    }

    #[test]
    fn test_doc_tags_are_located_on_their_own_line() {
        let source = "$x = 1;\n/**\n * @param int $a\n * @return boolean\n */\nfunction f($a) {}";
        let violations = check(ValidScalarTypeName, source);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, Some(4));
        assert_eq!(violations[0].location.column, Some(12));
    }

    #[test]
    fn test_short_names_are_clean() {
        let source = "/** @var int|null */\n$a = (float) $b;";
        assert!(check(ValidScalarTypeName, source).is_empty());
    }
}
