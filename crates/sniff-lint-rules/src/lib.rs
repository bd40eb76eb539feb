//! # sniff-lint-rules
//!
//! Built-in coding-standard rules for sniff-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | SL001 | `array-declaration` | Spacing, trailing commas and alignment of array literals |
//! | SL002 | `disallow-tab-indent` | Indentation must use spaces |
//! | SL003 | `boolean-not-spacing` | No whitespace after `!` |
//! | SL004 | `unary-operator-spacing` | No whitespace after unary `+` / `-` |
//! | SL005 | `valid-class-name` | `Interface` / `Trait` / `Exception` suffixes, `Abstract` prefix |
//! | SL006 | `valid-scalar-type-name` | `bool` / `int` / `float` in casts and doc tags |
//! | SL007 | `namespace-declaration` | One blank line before `namespace` |
//! | SL008 | `property-declaration` | Properties before methods |
//! | SL009 | `end-of-file-newline` | Files end with a single newline |
//!
//! ## Usage
//!
//! ```ignore
//! use sniff_lint_core::Engine;
//! use sniff_lint_rules::{ArrayDeclaration, BooleanNotSpacing};
//!
//! let engine = Engine::builder()
//!     .root("./src")
//!     .rule(ArrayDeclaration::new().indent(2))
//!     .rule(BooleanNotSpacing::new())
//!     .fix(true)
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod array_declaration;
mod boolean_not_spacing;
mod disallow_tab_indent;
mod end_of_file_newline;
mod namespace_declaration;
mod presets;
mod property_declaration;
mod unary_operator_spacing;
mod valid_class_name;
mod valid_scalar_type_name;

#[cfg(test)]
mod testing;

pub use array_declaration::ArrayDeclaration;
pub use boolean_not_spacing::BooleanNotSpacing;
pub use disallow_tab_indent::DisallowTabIndent;
pub use end_of_file_newline::EndOfFileNewline;
pub use namespace_declaration::NamespaceDeclaration;
pub use presets::{all_rules, minimal_rules, recommended_rules, strict_rules, Preset};
pub use property_declaration::PropertyDeclaration;
pub use unary_operator_spacing::UnaryOperatorSpacing;
pub use valid_class_name::ValidClassName;
pub use valid_scalar_type_name::ValidScalarTypeName;

/// Re-export core types for convenience.
pub use sniff_lint_core::{Rule, Severity, Violation};
