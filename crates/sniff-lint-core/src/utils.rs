//! Utility functions for rule implementations.

pub mod suppression;
pub mod text;

#[doc(inline)]
pub use suppression::{parse_allow_directive, AllowDirective, Suppressions};
#[doc(inline)]
pub use text::{display_width, has_newline, spaces};
