//! Tokens and the indexable token stream rules operate on.
//!
//! A [`TokenStream`] is immutable for the duration of a dispatcher pass.
//! Positions handed to rules are stream indices, never byte offsets, and stay
//! valid until the engine re-tokenizes the fixed source.

use serde::{Deserialize, Serialize};

/// Classification of a lexical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// `<?php` or `<?=`.
    OpenTag,
    /// `?>`.
    CloseTag,
    /// Text outside of code tags.
    InlineHtml,
    /// A run of spaces and tabs that does not contain a line break.
    Whitespace,
    /// A single line break (`\n` or `\r\n`).
    Newline,
    /// `// ...`, `# ...` or `/* ... */`.
    Comment,
    /// `/** ... */`.
    DocComment,
    /// `$name`.
    Variable,
    /// An identifier that is not a recognized keyword.
    Name,
    /// A reserved word without a dedicated kind (`return`, `static`, ...).
    Keyword,
    /// `array` keyword.
    Array,
    /// `function` keyword.
    Function,
    /// `fn` keyword of an arrow function.
    Fn,
    /// `class` keyword.
    Class,
    /// `interface` keyword.
    Interface,
    /// `trait` keyword.
    Trait,
    /// `extends` keyword.
    Extends,
    /// `abstract` keyword.
    Abstract,
    /// `namespace` keyword.
    Namespace,
    /// `public`, `protected` or `private`.
    Visibility,
    /// Quoted string literal.
    String,
    /// Integer or float literal.
    Number,
    /// Type cast such as `(int)`.
    Cast,
    /// `(`.
    OpenParen,
    /// `)`.
    CloseParen,
    /// `[` opening an array literal.
    OpenShortArray,
    /// `]` closing an array literal.
    CloseShortArray,
    /// `[` of an index access.
    OpenSquare,
    /// `]` of an index access.
    CloseSquare,
    /// `{`.
    OpenCurly,
    /// `}`.
    CloseCurly,
    /// `,`.
    Comma,
    /// `=>`.
    DoubleArrow,
    /// `;`.
    Semicolon,
    /// `!`.
    BooleanNot,
    /// `+`.
    Plus,
    /// `-`.
    Minus,
    /// Any other operator or punctuation.
    Operator,
    /// End-of-stream marker. Always the last token and always empty.
    Eof,
}

impl TokenKind {
    /// Whitespace or line break.
    #[must_use]
    pub fn is_whitespace(self) -> bool {
        matches!(self, Self::Whitespace | Self::Newline)
    }

    /// Tokens that carry no syntax: whitespace, line breaks and comments.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::Newline | Self::Comment | Self::DocComment
        )
    }

    /// Opening bracket of any flavor.
    #[must_use]
    pub fn is_opener(self) -> bool {
        matches!(
            self,
            Self::OpenParen | Self::OpenShortArray | Self::OpenSquare | Self::OpenCurly
        )
    }

    /// Closing bracket of any flavor.
    #[must_use]
    pub fn is_closer(self) -> bool {
        matches!(
            self,
            Self::CloseParen | Self::CloseShortArray | Self::CloseSquare | Self::CloseCurly
        )
    }

    /// The closing kind that pairs with this opener.
    #[must_use]
    pub fn closer(self) -> Option<Self> {
        match self {
            Self::OpenParen => Some(Self::CloseParen),
            Self::OpenShortArray => Some(Self::CloseShortArray),
            Self::OpenSquare => Some(Self::CloseSquare),
            Self::OpenCurly => Some(Self::CloseCurly),
            _ => None,
        }
    }
}

/// A classified lexical unit with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token classification.
    pub kind: TokenKind,
    /// Raw source text.
    pub text: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, counted in characters).
    pub column: usize,
    /// Length of the text in characters.
    pub length: usize,
}

impl Token {
    /// Creates a token, deriving its length from the text.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Self {
            kind,
            text,
            line,
            column,
            length,
        }
    }

    /// Creates the end-of-stream marker.
    #[must_use]
    pub fn eof(line: usize, column: usize) -> Self {
        Self::new(TokenKind::Eof, "", line, column)
    }

    /// Returns true if the token has the given kind.
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Returns true if the token has the given kind and exact text.
    #[must_use]
    pub fn is_text(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }
}

/// Ordered, index-addressable sequence of tokens for one source file.
///
/// Bracket partners and nesting depth are computed once on construction
/// with an explicit opener stack, so structural rules can ask "which depth is
/// this comma at" instead of re-counting parentheses per token.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    partners: Vec<Option<usize>>,
    depths: Vec<usize>,
}

impl TokenStream {
    /// Builds a stream, appending an end-of-stream marker if the tokenizer
    /// did not supply one.
    #[must_use]
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let (line, column) = tokens.last().map_or((1, 1), end_position);
            tokens.push(Token::eof(line, column));
        }

        let mut partners = vec![None; tokens.len()];
        let mut depths = vec![0; tokens.len()];
        let mut openers: Vec<(usize, TokenKind)> = Vec::new();

        for (index, token) in tokens.iter().enumerate() {
            if token.kind.is_opener() {
                depths[index] = openers.len();
                openers.push((index, token.kind));
            } else if token.kind.is_closer() {
                let matched = openers
                    .iter()
                    .rposition(|(_, kind)| kind.closer() == Some(token.kind));
                if let Some(position) = matched {
                    // Openers above the match are never closed.
                    openers.truncate(position + 1);
                    if let Some((opener, _)) = openers.pop() {
                        partners[opener] = Some(index);
                        partners[index] = Some(opener);
                    }
                }
                depths[index] = openers.len();
            } else {
                depths[index] = openers.len();
            }
        }

        Self {
            tokens,
            partners,
            depths,
        }
    }

    /// Number of tokens, including the end-of-stream marker.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the stream holds nothing but the end-of-stream marker.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.len() <= 1
    }

    /// All tokens in source order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Iterates over the tokens.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Token at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Kind of the token at `index`; [`TokenKind::Eof`] past the end.
    #[must_use]
    pub fn kind(&self, index: usize) -> TokenKind {
        self.tokens.get(index).map_or(TokenKind::Eof, |t| t.kind)
    }

    /// Matching bracket of the token at `index`.
    #[must_use]
    pub fn partner(&self, index: usize) -> Option<usize> {
        self.partners.get(index).copied().flatten()
    }

    /// Number of unclosed brackets enclosing the token at `index`.
    ///
    /// An opener and its closer share the depth of their surroundings; the
    /// tokens between them sit one level deeper.
    #[must_use]
    pub fn depth(&self, index: usize) -> usize {
        self.depths.get(index).copied().unwrap_or(0)
    }

    /// Index of the end-of-stream marker.
    #[must_use]
    pub fn eof(&self) -> usize {
        self.tokens.len() - 1
    }

    /// First index in `start..end` whose token satisfies `pred`.
    pub fn next_where(
        &self,
        start: usize,
        end: Option<usize>,
        pred: impl Fn(&Token) -> bool,
    ) -> Option<usize> {
        let end = end.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (start..end).find(|&i| pred(&self.tokens[i]))
    }

    /// Last index in `stop..=start` whose token satisfies `pred`.
    pub fn prev_where(
        &self,
        start: usize,
        stop: usize,
        pred: impl Fn(&Token) -> bool,
    ) -> Option<usize> {
        if start >= self.tokens.len() || stop > start {
            return None;
        }
        (stop..=start).rev().find(|&i| pred(&self.tokens[i]))
    }

    /// Next token in `start..end` that is not trivia.
    #[must_use]
    pub fn next_significant(&self, start: usize, end: Option<usize>) -> Option<usize> {
        self.next_where(start, end, |t| !t.kind.is_trivia())
    }

    /// Previous token in `stop..=start` that is not trivia.
    #[must_use]
    pub fn prev_significant(&self, start: usize, stop: usize) -> Option<usize> {
        self.prev_where(start, stop, |t| !t.kind.is_trivia())
    }

    /// Next token in `start..end` that is not whitespace or a line break.
    #[must_use]
    pub fn next_non_whitespace(&self, start: usize, end: Option<usize>) -> Option<usize> {
        self.next_where(start, end, |t| !t.kind.is_whitespace())
    }

    /// Previous token in `stop..=start` that is not whitespace or a line break.
    #[must_use]
    pub fn prev_non_whitespace(&self, start: usize, stop: usize) -> Option<usize> {
        self.prev_where(start, stop, |t| !t.kind.is_whitespace())
    }

    /// Index of the first token on the line of the token at `index`.
    #[must_use]
    pub fn first_on_line(&self, index: usize) -> usize {
        let Some(line) = self.tokens.get(index).map(|t| t.line) else {
            return index;
        };
        let mut first = index;
        while first > 0 && self.tokens[first - 1].line == line {
            // A multi-line comment ending on this line still starts earlier.
            if self.tokens[first - 1].kind == TokenKind::Newline {
                break;
            }
            first -= 1;
        }
        first
    }

    /// Returns true if only whitespace precedes the token on its line.
    #[must_use]
    pub fn is_first_on_line(&self, index: usize) -> bool {
        let first = self.first_on_line(index);
        (first..index).all(|i| self.tokens[i].kind == TokenKind::Whitespace)
    }

    /// Width of the leading whitespace on the line of the token at `index`.
    ///
    /// Zero when the line starts with anything other than whitespace.
    #[must_use]
    pub fn line_indent(&self, index: usize) -> usize {
        let first = self.first_on_line(index);
        match self.tokens.get(first) {
            Some(t) if t.kind == TokenKind::Whitespace && t.column == 1 => t.length,
            _ => 0,
        }
    }

    /// Concatenated text of the tokens in `start..=end`.
    #[must_use]
    pub fn text_between(&self, start: usize, end: usize) -> String {
        if start > end || start >= self.tokens.len() {
            return String::new();
        }
        let end = end.min(self.tokens.len() - 1);
        self.tokens[start..=end].iter().map(|t| t.text.as_str()).collect()
    }

    /// Closing curly brace of the block owned by the keyword at `index`
    /// (`function`, `class`, `interface`, `trait`).
    ///
    /// Returns `None` for declarations without a body, such as abstract
    /// methods terminated by `;`.
    #[must_use]
    pub fn scope_closer(&self, index: usize) -> Option<usize> {
        let opener = self.next_where(index + 1, None, |t| {
            matches!(t.kind, TokenKind::OpenCurly | TokenKind::Semicolon)
        })?;
        if self.kind(opener) == TokenKind::Semicolon {
            return None;
        }
        self.partner(opener)
    }

    /// Serializes the stream back to source text.
    #[must_use]
    pub fn render(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}

impl std::ops::Index<usize> for TokenStream {
    type Output = Token;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Line and column just past the end of a token.
fn end_position(token: &Token) -> (usize, usize) {
    let breaks = token.text.matches('\n').count();
    if breaks == 0 {
        (token.line, token.column + token.length)
    } else {
        let tail = token.text.rsplit('\n').next().unwrap_or("");
        (token.line + breaks, tail.chars().count() + 1)
    }
}
