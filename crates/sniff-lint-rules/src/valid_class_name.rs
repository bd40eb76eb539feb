//! Rule enforcing naming conventions for class-like declarations.
//!
//! # Detected Patterns
//!
//! - Interfaces not suffixed with `Interface`
//! - Traits not suffixed with `Trait`
//! - Classes extending an `*Exception` not suffixed with `Exception`
//! - Abstract classes not prefixed with `Abstract`

use sniff_lint_core::{Rule, RuleContext, RuleError, Scan, TokenKind, TokenStream};

/// Rule code for valid-class-name.
pub const CODE: &str = "SL005";

/// Rule name for valid-class-name.
pub const NAME: &str = "valid-class-name";

/// Checks interface, trait, exception and abstract class names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidClassName;

impl ValidClassName {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Declared name following the keyword at `index`.
fn declared_name(stream: &TokenStream, index: usize) -> Option<usize> {
    stream
        .next_significant(index + 1, None)
        .filter(|&name| stream.kind(name) == TokenKind::Name)
}

/// Last segment of a possibly qualified name.
fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

impl Rule for ValidClassName {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Interfaces, traits, exceptions and abstract classes follow naming conventions"
    }

    fn interests(&self) -> &'static [TokenKind] {
        &[
            TokenKind::Interface,
            TokenKind::Trait,
            TokenKind::Extends,
            TokenKind::Abstract,
        ]
    }

    fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
        let stream = ctx.stream();
        match stream.kind(position) {
            TokenKind::Interface => {
                if let Some(name) = declared_name(stream, position) {
                    if !stream[name].text.ends_with("Interface") {
                        ctx.add_error(
                            "InvalidInterfaceName",
                            "Interface name is not suffixed with \"Interface\"",
                            Some(position),
                        );
                    }
                }
            }
            TokenKind::Trait => {
                if let Some(name) = declared_name(stream, position) {
                    if !stream[name].text.ends_with("Trait") {
                        ctx.add_error(
                            "InvalidTraitName",
                            "Trait name is not suffixed with \"Trait\"",
                            Some(position),
                        );
                    }
                }
            }
            TokenKind::Extends => {
                let Some(parent) = declared_name(stream, position) else {
                    return Ok(Scan::Continue);
                };
                if !short_name(&stream[parent].text).ends_with("Exception") {
                    return Ok(Scan::Continue);
                }
                let class = position
                    .checked_sub(1)
                    .and_then(|before| stream.prev_where(before, 0, |t| t.kind == TokenKind::Class));
                let name = class.and_then(|class| declared_name(stream, class));
                if let Some(name) = name {
                    if !stream[name].text.ends_with("Exception") {
                        ctx.add_error(
                            "InvalidExceptionName",
                            "Exception name is not suffixed with \"Exception\"",
                            Some(position),
                        );
                    }
                }
            }
            TokenKind::Abstract => {
                // Abstract methods are not class declarations.
                let Some(class) = stream.next_significant(position + 1, None) else {
                    return Ok(Scan::Continue);
                };
                if stream.kind(class) != TokenKind::Class {
                    return Ok(Scan::Continue);
                }
                if let Some(name) = declared_name(stream, class) {
                    if !stream[name].text.starts_with("Abstract") {
                        ctx.add_error(
                            "InvalidAbstractName",
                            "Abstract class name is not prefixed with \"Abstract\"",
                            Some(position),
                        );
                    }
                }
            }
            _ => {}
        }
        Ok(Scan::Continue)
    }
}
