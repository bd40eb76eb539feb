//! Tokenizer seam and the built-in PHP tokenizer.

use crate::token::{Token, TokenKind};

/// Error raised when source text cannot be split into tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    /// A string literal is missing its closing quote.
    #[error("unterminated string starting at line {line}, column {column}")]
    UnterminatedString {
        /// Line where the literal starts.
        line: usize,
        /// Column where the literal starts.
        column: usize,
    },
    /// A block comment is missing its `*/`.
    #[error("unterminated comment starting at line {line}, column {column}")]
    UnterminatedComment {
        /// Line where the comment starts.
        line: usize,
        /// Column where the comment starts.
        column: usize,
    },
    /// Heredoc and nowdoc literals are not tokenized.
    #[error("heredoc literal at line {line}, column {column} is not supported")]
    UnsupportedHeredoc {
        /// Line of the `<<<` marker.
        line: usize,
        /// Column of the `<<<` marker.
        column: usize,
    },
}

impl TokenizeError {
    /// Line the error points at.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::UnterminatedString { line, .. }
            | Self::UnterminatedComment { line, .. }
            | Self::UnsupportedHeredoc { line, .. } => *line,
        }
    }
}

/// Turns source text into an ordered list of tokens.
///
/// Implementations must be lossless: concatenating the token texts yields
/// the input unchanged.
pub trait Tokenizer: Send + Sync {
    /// Tokenizes `source`. The returned list may omit the end marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the source contains a construct the tokenizer
    /// cannot represent.
    fn tokenize(&self, source: &str) -> Result<Vec<Token>, TokenizeError>;
}

/// Multi-character operators, longest first.
const OPERATORS: &[&str] = &[
    "<=>", "**=", "...", "<<=", ">>=", "===", "!==", "??=", "?->", "::", "->", "=>", "++", "--",
    "==", "!=", "<>", "<=", ">=", "&&", "||", "??", "+=", "-=", "*=", "/=", ".=", "%=", "&=",
    "|=", "^=", "<<", ">>", "**",
];

const CASTS: &[&str] = &[
    "int", "integer", "bool", "boolean", "float", "double", "real", "string", "array", "object",
    "unset", "binary",
];

/// Lossless tokenizer for PHP source.
///
/// Covers what structural rules need: tags, trivia, variables, names and
/// keywords, string and number literals, casts, brackets and operators.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpTokenizer {
    start_in_code: bool,
}

impl PhpTokenizer {
    /// Creates a tokenizer for whole files, which start as inline HTML until
    /// the first `<?php` tag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_in_code: false,
        }
    }

    /// Creates a tokenizer for code fragments without an open tag.
    #[must_use]
    pub fn snippet() -> Self {
        Self {
            start_in_code: true,
        }
    }
}

impl Tokenizer for PhpTokenizer {
    fn tokenize(&self, source: &str) -> Result<Vec<Token>, TokenizeError> {
        Lexer::new(source, self.start_in_code).run()
    }
}

struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    column: usize,
    in_code: bool,
    tokens: Vec<Token>,
}

impl<'s> Lexer<'s> {
    fn new(src: &'s str, in_code: bool) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            in_code,
            tokens: Vec::new(),
        }
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Emits the next `len` bytes as one token and advances the cursor.
    fn push(&mut self, kind: TokenKind, len: usize) {
        let text = &self.src[self.pos..self.pos + len];
        self.tokens
            .push(Token::new(kind, text, self.line, self.column));
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += len;
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizeError> {
        while self.pos < self.src.len() {
            if self.in_code {
                self.lex_code()?;
            } else {
                self.lex_html();
            }
        }
        self.tokens.push(Token::eof(self.line, self.column));
        Ok(self.tokens)
    }

    fn lex_html(&mut self) {
        let rest = self.rest();
        match rest.find("<?") {
            Some(0) => {
                let len = if starts_with_ignore_case(rest, "<?php") {
                    5
                } else if rest.starts_with("<?=") {
                    3
                } else {
                    2
                };
                self.push(TokenKind::OpenTag, len);
                self.in_code = true;
            }
            Some(n) => self.push(TokenKind::InlineHtml, n),
            None => self.push(TokenKind::InlineHtml, rest.len()),
        }
    }

    fn lex_code(&mut self) -> Result<(), TokenizeError> {
        let rest = self.rest();
        let Some(c) = self.peek() else {
            return Ok(());
        };

        if rest.starts_with("\r\n") {
            self.push(TokenKind::Newline, 2);
        } else if c == '\n' {
            self.push(TokenKind::Newline, 1);
        } else if c == '\r' {
            self.push(TokenKind::Whitespace, 1);
        } else if c == ' ' || c == '\t' {
            let len = rest
                .find(|ch: char| !matches!(ch, ' ' | '\t'))
                .unwrap_or(rest.len());
            self.push(TokenKind::Whitespace, len);
        } else if rest.starts_with("?>") {
            self.push(TokenKind::CloseTag, 2);
            self.in_code = false;
        } else if rest.starts_with("/**") && !rest.starts_with("/**/") {
            self.block_comment(TokenKind::DocComment)?;
        } else if rest.starts_with("/*") {
            self.block_comment(TokenKind::Comment)?;
        } else if rest.starts_with("//") || (c == '#' && !rest.starts_with("#[")) {
            let len = line_comment_len(rest);
            self.push(TokenKind::Comment, len);
        } else if rest.starts_with("<<<") {
            return Err(TokenizeError::UnsupportedHeredoc {
                line: self.line,
                column: self.column,
            });
        } else if c == '$' && self.peek_at(1).is_some_and(is_ident_start) {
            let len = 1 + ident_len(&rest[1..]);
            self.push(TokenKind::Variable, len);
        } else if is_ident_start(c) || (c == '\\' && self.peek_at(1).is_some_and(is_ident_start)) {
            let len = name_len(rest);
            let kind = keyword_kind(&rest[..len]);
            self.push(kind, len);
        } else if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
            let len = number_len(rest);
            self.push(TokenKind::Number, len);
        } else if c == '\'' || c == '"' || c == '`' {
            let len = self.string_len(rest, c)?;
            self.push(TokenKind::String, len);
        } else if c == '(' {
            match cast_len(rest) {
                Some(len) => self.push(TokenKind::Cast, len),
                None => self.push(TokenKind::OpenParen, 1),
            }
        } else {
            self.punctuation(rest, c);
        }
        Ok(())
    }

    fn punctuation(&mut self, rest: &str, c: char) {
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            let kind = if *op == "=>" {
                TokenKind::DoubleArrow
            } else {
                TokenKind::Operator
            };
            self.push(kind, op.len());
            return;
        }
        let kind = match c {
            ')' => TokenKind::CloseParen,
            '{' => TokenKind::OpenCurly,
            '}' => TokenKind::CloseCurly,
            '[' => {
                if self.index_access_follows() {
                    TokenKind::OpenSquare
                } else {
                    TokenKind::OpenShortArray
                }
            }
            ']' => self.square_closer(),
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '!' => TokenKind::BooleanNot,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            _ => TokenKind::Operator,
        };
        self.push(kind, c.len_utf8());
    }

    /// `[` after a value-like token is an index access, otherwise it opens an
    /// array literal.
    fn index_access_follows(&self) -> bool {
        self.tokens
            .iter()
            .rev()
            .find(|t| !t.kind.is_trivia())
            .is_some_and(|t| {
                matches!(
                    t.kind,
                    TokenKind::Variable
                        | TokenKind::Name
                        | TokenKind::String
                        | TokenKind::CloseParen
                        | TokenKind::CloseSquare
                        | TokenKind::CloseShortArray
                )
            })
    }

    /// Picks the closer kind matching the innermost unclosed square bracket.
    fn square_closer(&self) -> TokenKind {
        let mut pending = 0usize;
        for token in self.tokens.iter().rev() {
            match token.kind {
                TokenKind::CloseSquare | TokenKind::CloseShortArray => pending += 1,
                TokenKind::OpenSquare | TokenKind::OpenShortArray if pending > 0 => pending -= 1,
                TokenKind::OpenSquare => return TokenKind::CloseSquare,
                TokenKind::OpenShortArray => return TokenKind::CloseShortArray,
                _ => {}
            }
        }
        TokenKind::CloseShortArray
    }

    fn block_comment(&mut self, kind: TokenKind) -> Result<(), TokenizeError> {
        let rest = self.rest();
        match rest[2..].find("*/") {
            Some(end) => {
                self.push(kind, end + 4);
                Ok(())
            }
            None => Err(TokenizeError::UnterminatedComment {
                line: self.line,
                column: self.column,
            }),
        }
    }

    fn string_len(&self, rest: &str, quote: char) -> Result<usize, TokenizeError> {
        let mut escaped = false;
        for (i, ch) in rest.char_indices().skip(1) {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                return Ok(i + ch.len_utf8());
            }
        }
        Err(TokenizeError::UnterminatedString {
            line: self.line,
            column: self.column,
        })
    }
}

fn starts_with_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .get(..needle.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(needle))
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic() || (!c.is_ascii() && !c.is_whitespace())
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

fn ident_len(s: &str) -> usize {
    s.find(|c: char| !is_ident_char(c)).unwrap_or(s.len())
}

/// Length of an identifier, including namespace separators.
fn name_len(s: &str) -> usize {
    s.find(|c: char| !is_ident_char(c) && c != '\\')
        .unwrap_or(s.len())
}

fn number_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    if s.len() > 1 && bytes[0] == b'0' && matches!(bytes[1], b'x' | b'X' | b'b' | b'B') {
        return 2 + s[2..]
            .find(|c: char| !(c.is_ascii_hexdigit() || c == '_'))
            .unwrap_or(s.len() - 2);
    }
    let mut len = 0;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let chars: Vec<char> = s.chars().collect();
    while len < chars.len() {
        let c = chars[len];
        if c.is_ascii_digit() || c == '_' {
            len += 1;
        } else if c == '.' && !seen_dot && !seen_exp {
            seen_dot = true;
            len += 1;
        } else if matches!(c, 'e' | 'E')
            && !seen_exp
            && chars
                .get(len + 1)
                .is_some_and(|n| n.is_ascii_digit() || matches!(n, '+' | '-'))
        {
            seen_exp = true;
            len += 2;
        } else {
            break;
        }
    }
    len
}

/// Length of a line comment, stopping before the line break or a close tag.
fn line_comment_len(s: &str) -> usize {
    let line_end = s.find(['\n', '\r']).unwrap_or(s.len());
    match s[..line_end].find("?>") {
        Some(tag) => tag,
        None => line_end,
    }
}

/// Length of a cast such as `( int )`, if `s` starts with one.
fn cast_len(s: &str) -> Option<usize> {
    let close = s.find(')')?;
    let inner = s[1..close].trim_matches([' ', '\t']);
    CASTS
        .iter()
        .any(|cast| inner.eq_ignore_ascii_case(cast))
        .then_some(close + 1)
}

fn keyword_kind(word: &str) -> TokenKind {
    match word.to_ascii_lowercase().as_str() {
        "array" => TokenKind::Array,
        "function" => TokenKind::Function,
        "fn" => TokenKind::Fn,
        "class" => TokenKind::Class,
        "interface" => TokenKind::Interface,
        "trait" => TokenKind::Trait,
        "extends" => TokenKind::Extends,
        "abstract" => TokenKind::Abstract,
        "namespace" => TokenKind::Namespace,
        "public" | "protected" | "private" => TokenKind::Visibility,
        "return" | "echo" | "print" | "yield" | "case" | "as" | "new" | "throw" | "static"
        | "const" | "use" | "var" | "final" | "readonly" | "if" | "else" | "elseif" | "while"
        | "do" | "for" | "foreach" | "switch" | "break" | "continue" | "default" | "try"
        | "catch" | "finally" | "instanceof" | "implements" | "global" | "include"
        | "include_once" | "require" | "require_once" | "and" | "or" | "xor" | "match"
        | "enum" | "clone" | "goto" | "declare" | "list" | "isset" | "unset" | "empty"
        | "exit" | "die" | "insteadof" => TokenKind::Keyword,
        _ => TokenKind::Name,
    }
}
