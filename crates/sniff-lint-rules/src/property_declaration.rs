//! Rule requiring properties to be declared before methods.

use sniff_lint_core::{Rule, RuleContext, RuleError, Scan, TokenKind, TokenStream};

/// Rule code for property-declaration.
pub const CODE: &str = "SL008";

/// Rule name for property-declaration.
pub const NAME: &str = "property-declaration";

/// Flags properties that follow the first method of a class.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyDeclaration;

impl PropertyDeclaration {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Returns true if the visibility keyword at `index` declares a property,
/// looking past modifiers and type hints such as `static ?int`.
fn declares_property(stream: &TokenStream, index: usize, end: usize) -> bool {
    let mut cursor = index;
    while let Some(next) = stream.next_significant(cursor + 1, Some(end)) {
        let token = &stream[next];
        match token.kind {
            TokenKind::Variable => return true,
            TokenKind::Keyword | TokenKind::Name | TokenKind::Array => cursor = next,
            TokenKind::Operator if matches!(token.text.as_str(), "?" | "|" | "&") => cursor = next,
            _ => return false,
        }
    }
    false
}

impl Rule for PropertyDeclaration {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Declare class properties before methods"
    }

    fn interests(&self) -> &'static [TokenKind] {
        &[TokenKind::Class]
    }

    fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
        let stream = ctx.stream();
        // `Foo::class` and declarations without a body.
        let Some(end) = stream.scope_closer(position) else {
            return Ok(Scan::Continue);
        };

        let Some(first_method) =
            stream.next_where(position + 1, Some(end), |t| t.kind == TokenKind::Function)
        else {
            return Ok(Scan::SkipTo(end + 1));
        };

        // Members sit directly in the class body; deeper modifiers belong to
        // promoted constructor parameters or nested scopes.
        let member_depth = stream.depth(end) + 1;
        let mut cursor = first_method + 1;
        while let Some(visibility) =
            stream.next_where(cursor, Some(end), |t| t.kind == TokenKind::Visibility)
        {
            if stream.depth(visibility) == member_depth
                && declares_property(stream, visibility, end)
            {
                ctx.add_error(
                    "Invalid",
                    "Declare class properties before methods",
                    Some(visibility),
                );
            }
            cursor = visibility + 1;
        }

        Ok(Scan::SkipTo(end + 1))
    }
}
