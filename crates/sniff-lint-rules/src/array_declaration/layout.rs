//! Splits an array literal into entries.
//!
//! Only tokens at the literal's own nesting depth act as separators, so
//! commas and arrows inside calls, closures or nested arrays never split an
//! entry of the outer literal.

use sniff_lint_core::utils::text::display_width;
use sniff_lint_core::{TokenKind, TokenStream};

/// Bracket positions of one array literal.
#[derive(Debug, Clone, Copy)]
pub(super) struct Literal {
    /// `array` keyword or short-array opener; anchors literal-wide messages.
    pub start: usize,
    pub opener: usize,
    pub closer: usize,
}

impl Literal {
    /// Depth of the tokens directly inside the brackets.
    pub fn inner_depth(self, stream: &TokenStream) -> usize {
        stream.depth(self.opener) + 1
    }

    pub fn is_single_line(self, stream: &TokenStream) -> bool {
        stream[self.opener].line == stream[self.closer].line
    }
}

/// Key of a `key => value` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Key {
    pub start: usize,
    pub end: usize,
    /// Display width of the key text from `start` through `end`.
    pub width: usize,
}

/// One array element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct Entry {
    pub key: Option<Key>,
    pub arrow: Option<usize>,
    pub value: Option<usize>,
    /// Comma terminating the entry; `None` for a last entry without one.
    pub comma: Option<usize>,
}

impl Entry {
    pub fn is_keyed(&self) -> bool {
        self.arrow.is_some()
    }
}

/// A mixed keyed/unkeyed listing found while segmenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum KeyMismatch {
    /// An arrow after the first entry had no key; anchored at the arrow.
    KeySpecified(usize),
    /// A bare value after the first entry had a key; anchored at the
    /// separator that ended it.
    NoKeySpecified(usize),
}

/// Entries and own-depth separators of a literal.
#[derive(Debug, Clone, Default)]
pub(super) struct Layout {
    pub entries: Vec<Entry>,
    pub commas: Vec<usize>,
    pub arrows: Vec<usize>,
    pub max_key_width: usize,
    pub mismatches: Vec<KeyMismatch>,
}

impl Layout {
    /// Walks the tokens between the brackets of `literal`.
    pub fn scan(stream: &TokenStream, literal: Literal) -> Self {
        let depth = literal.inner_depth(stream);
        let last_inner = literal.closer.saturating_sub(1);
        let mut layout = Self::default();
        let mut boundary = literal.opener;
        let mut entry_open = false;
        let mut key_used = false;
        let mut single_used = false;

        let mut i = literal.opener + 1;
        while i < literal.closer {
            if stream.depth(i) != depth {
                i += 1;
                continue;
            }

            match stream.kind(i) {
                // The arrow of an arrow function belongs to its value.
                TokenKind::Fn => {
                    if let Some(arrow) = stream.next_where(i + 1, Some(literal.closer), |t| {
                        t.kind == TokenKind::DoubleArrow
                    }) {
                        if stream.depth(arrow) == depth {
                            i = arrow + 1;
                            continue;
                        }
                    }
                }
                TokenKind::DoubleArrow => {
                    if single_used {
                        layout.mismatches.push(KeyMismatch::KeySpecified(i));
                    } else {
                        key_used = true;
                    }

                    let key = Self::key_before(stream, boundary, i);
                    if let Some(key) = key {
                        layout.max_key_width = layout.max_key_width.max(key.width);
                    }
                    layout.entries.push(Entry {
                        key,
                        arrow: Some(i),
                        value: stream.next_significant(i + 1, Some(literal.closer)),
                        comma: None,
                    });
                    layout.arrows.push(i);
                    entry_open = true;
                    boundary = i;
                    i += 1;
                    continue;
                }
                _ => {}
            }

            let is_comma = stream.kind(i) == TokenKind::Comma;
            if is_comma || i == last_inner {
                let end = if is_comma { i } else { i + 1 };
                let value = stream.next_significant(boundary + 1, Some(end));
                if let Some(value) = value {
                    if stream.kind(boundary) != TokenKind::DoubleArrow {
                        if key_used {
                            layout.mismatches.push(KeyMismatch::NoKeySpecified(i));
                        } else {
                            single_used = true;
                        }
                        layout.entries.push(Entry {
                            value: Some(value),
                            ..Entry::default()
                        });
                        entry_open = true;
                    }
                }
                if is_comma {
                    if entry_open {
                        if let Some(entry) = layout.entries.last_mut() {
                            entry.comma = Some(i);
                        }
                        entry_open = false;
                    }
                    layout.commas.push(i);
                    boundary = i;
                }
            }
            i += 1;
        }

        layout
    }

    fn key_before(stream: &TokenStream, boundary: usize, arrow: usize) -> Option<Key> {
        let start = stream.next_significant(boundary + 1, Some(arrow))?;
        let end = stream.prev_significant(arrow - 1, start)?;
        let width = display_width(&stream.text_between(start, end));
        Some(Key { start, end, width })
    }

    /// Comma that ended the entry before `index`, if it had one.
    pub fn previous_comma(&self, index: usize) -> Option<usize> {
        index
            .checked_sub(1)
            .and_then(|prev| self.entries.get(prev))
            .and_then(|entry| entry.comma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sniff_lint_core::{PhpTokenizer, Tokenizer};

    fn layout_of(source: &str) -> (TokenStream, Layout) {
        let stream = TokenStream::new(PhpTokenizer::snippet().tokenize(source).unwrap());
        let opener = stream
            .next_where(0, None, |t| t.kind == TokenKind::OpenShortArray)
            .unwrap();
        let literal = Literal {
            start: opener,
            opener,
            closer: stream.partner(opener).unwrap(),
        };
        let layout = Layout::scan(&stream, literal);
        (stream, layout)
    }

    fn values(stream: &TokenStream, layout: &Layout) -> Vec<String> {
        layout
            .entries
            .iter()
            .map(|e| e.value.map_or_else(String::new, |v| stream[v].text.clone()))
            .collect()
    }

    #[test]
    fn test_bare_values() {
        let (stream, layout) = layout_of("[1, 2, 3]");
        assert_eq!(values(&stream, &layout), vec!["1", "2", "3"]);
        assert_eq!(layout.commas.len(), 2);
        assert!(layout.entries[2].comma.is_none());
        assert!(layout.arrows.is_empty());
    }

    #[test]
    fn test_nested_separators_are_ignored() {
        let (stream, layout) = layout_of("[foo(1, 2), [3, 4], 5,]");
        assert_eq!(values(&stream, &layout), vec!["foo", "[", "5"]);
        assert_eq!(layout.commas.len(), 3);
    }

    #[test]
    fn test_keyed_entries() {
        let (stream, layout) = layout_of("['a' => 1, 'long' => [2 => 3]]");
        assert_eq!(layout.arrows.len(), 2);
        assert_eq!(layout.max_key_width, 6);
        let key = layout.entries[1].key.unwrap();
        assert_eq!(stream[key.start].text, "'long'");
        assert_eq!(values(&stream, &layout), vec!["1", "["]);
        assert!(layout.mismatches.is_empty());
    }

    #[test]
    fn test_arrow_function_value() {
        let (_, layout) = layout_of("['f' => fn($x) => $x + 1, 'g' => 2]");
        assert_eq!(layout.arrows.len(), 2);
        assert_eq!(layout.entries.len(), 2);
    }

    #[test]
    fn test_mixed_keys() {
        let (_, layout) = layout_of("[1, 'k' => 2]");
        assert_eq!(layout.mismatches.len(), 1);
        assert!(matches!(layout.mismatches[0], KeyMismatch::KeySpecified(_)));

        let (_, layout) = layout_of("['k' => 2, 3]");
        assert!(matches!(
            layout.mismatches[..],
            [KeyMismatch::NoKeySpecified(_)]
        ));
    }

    #[test]
    fn test_comments_are_not_values() {
        let (_, layout) = layout_of("[\n    // nothing here\n]");
        assert!(layout.entries.is_empty());
    }
}
