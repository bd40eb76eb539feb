//! Text helpers shared by layout rules.

/// Displayed width of `text`, counted in characters.
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.chars().count()
}

/// A run of `n` spaces.
#[must_use]
pub fn spaces(n: usize) -> String {
    " ".repeat(n)
}

/// Returns true if `text` contains a line break.
#[must_use]
pub fn has_newline(text: &str) -> bool {
    text.contains('\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_counts_characters() {
        assert_eq!(display_width("'key'"), 5);
        assert_eq!(display_width("'clé'"), 5);
        assert_eq!(spaces(3), "   ");
        assert!(has_newline("a\nb"));
    }
}
