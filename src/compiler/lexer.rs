//! Lexical Analysis
//!
//! Switch-based scanner that tokenizes _Imp_ source text. The lexer never
//! fails: bytes that fit no token become [`TokenKind::Illegal`] tokens, and
//! the parser reports them through its normal error path.

use std::fmt;

/// Reserved words of the language.
const KEYWORDS: [(&str, TokenKind); 3] = [
    ("print", TokenKind::Print),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
];

/// Types of lexical elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Byte sequence that fits no other token.
    Illegal,
    /// End of input. Produced forever once the source is exhausted.
    Eof,

    /// Identifier (ASCII letters, digits and `_`, not starting with a digit).
    Ident,
    /// Integer literal.
    Int,
    /// `true` keyword literal.
    True,
    /// `false` keyword literal.
    False,
    /// `print` keyword.
    Print,

    /// `=` assignment operator.
    Assign,
    /// `+` operator.
    Plus,
    /// `-` operator.
    Minus,
    /// `*` operator.
    Asterisk,
    /// `/` operator.
    Slash,

    /// `;` statement terminator.
    Semicolon,
    /// `(` punctuation.
    ParenOpen,
    /// `)` punctuation.
    ParenClose,

    /// `// ...` comment, terminated by a newline.
    LineComment,
    /// `/* ... */` comment.
    BlockComment,
}

impl TokenKind {
    /// Returns `true` for the two comment kinds.
    #[must_use]
    pub const fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Illegal => "illegal",
            TokenKind::Eof => "end of input",
            TokenKind::Ident => "identifier",
            TokenKind::Int => "integer literal",
            TokenKind::True | TokenKind::False => "boolean literal",
            TokenKind::Print => "'print'",
            TokenKind::Assign => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Asterisk => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Semicolon => "';'",
            TokenKind::ParenOpen => "'('",
            TokenKind::ParenClose => "')'",
            TokenKind::LineComment | TokenKind::BlockComment => "comment",
        };
        f.write_str(s)
    }
}

/// Minimal lexical element: kind, literal text and source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    /// 1-based source line.
    pub line: usize,
    /// 1-based source column.
    pub col: usize,
}

impl Token {
    /// Returns an `Eof` token positioned at `line`:`col`.
    #[must_use]
    pub const fn eof(line: usize, col: usize) -> Self {
        Token {
            kind: TokenKind::Eof,
            literal: String::new(),
            line,
            col,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}\t{}\t{:?}", self.line, self.col, self.kind, self.literal)
    }
}

/// Produces tokens lazily from _Imp_ source text.
///
/// Only ASCII source is supported.
#[derive(Debug)]
pub struct Lexer<'a> {
    src: &'a [u8],
    cur: usize,
    line: usize,
    /// Index of the beginning of the current line, used to derive columns.
    bol: usize,
}

impl<'a> Lexer<'a> {
    /// Returns a new `Lexer` over `src`.
    #[must_use]
    pub const fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            cur: 0,
            line: 1,
            bol: 0,
        }
    }

    /// Pulls the next token from the source. Returns `Eof` tokens forever
    /// once the input is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.consume_whitespace();

        if !self.has_next() {
            return Token::eof(self.line, self.col());
        }

        let line = self.line;
        let col = self.col();

        match self.first() {
            b'0'..=b'9' => self.consume_int(line, col),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.consume_ident(line, col),
            b'/' if self.second() == Some(b'/') => self.consume_line_comment(line, col),
            b'/' if self.second() == Some(b'*') => self.consume_block_comment(line, col),
            b => {
                self.cur += 1;

                let kind = match b {
                    b'=' => TokenKind::Assign,
                    b'+' => TokenKind::Plus,
                    b'-' => TokenKind::Minus,
                    b'*' => TokenKind::Asterisk,
                    b'/' => TokenKind::Slash,
                    b';' => TokenKind::Semicolon,
                    b'(' => TokenKind::ParenOpen,
                    b')' => TokenKind::ParenClose,
                    _ => TokenKind::Illegal,
                };

                Token {
                    kind,
                    literal: (b as char).to_string(),
                    line,
                    col,
                }
            }
        }
    }

    /// Skips over all consecutive whitespace, tracking line boundaries.
    fn consume_whitespace(&mut self) {
        while self.has_next() && self.first().is_ascii_whitespace() {
            if self.first() == b'\n' {
                self.line += 1;
                self.bol = self.cur + 1;
            }
            self.cur += 1;
        }
    }

    /// Skips over an integer literal, producing a `Token`.
    fn consume_int(&mut self, line: usize, col: usize) -> Token {
        let start = self.cur;

        while self.has_next() && self.first().is_ascii_digit() {
            self.cur += 1;
        }

        Token {
            kind: TokenKind::Int,
            literal: self.slice(start),
            line,
            col,
        }
    }

    /// Skips over an identifier or keyword, producing a `Token`.
    fn consume_ident(&mut self, line: usize, col: usize) -> Token {
        let start = self.cur;

        while self.has_next() && (self.first().is_ascii_alphanumeric() || self.first() == b'_') {
            self.cur += 1;
        }

        let literal = self.slice(start);
        let kind = KEYWORDS
            .iter()
            .find(|(word, _)| *word == literal)
            .map_or(TokenKind::Ident, |(_, kind)| *kind);

        Token {
            kind,
            literal,
            line,
            col,
        }
    }

    /// Skips over a `//` comment up to (not including) the newline.
    fn consume_line_comment(&mut self, line: usize, col: usize) -> Token {
        let start = self.cur;

        while self.has_next() && self.first() != b'\n' {
            self.cur += 1;
        }

        Token {
            kind: TokenKind::LineComment,
            literal: self.slice(start),
            line,
            col,
        }
    }

    /// Skips over a `/* */` comment, including the closing delimiter. An
    /// unterminated comment runs to the end of input.
    fn consume_block_comment(&mut self, line: usize, col: usize) -> Token {
        let start = self.cur;
        self.cur += 2;

        while self.has_next() {
            if self.first() == b'\n' {
                self.line += 1;
                self.bol = self.cur + 1;
            } else if self.first() == b'*' && self.second() == Some(b'/') {
                self.cur += 2;
                break;
            }
            self.cur += 1;
        }

        Token {
            kind: TokenKind::BlockComment,
            literal: self.slice(start),
            line,
            col,
        }
    }

    /// Returns the source text from `start` up to the cursor.
    fn slice(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.src[start..self.cur]).into_owned()
    }

    /// Returns the current column in the line.
    #[inline]
    const fn col(&self) -> usize {
        self.cur - self.bol + 1
    }

    /// Returns the byte at the cursor. Does **not** advance.
    #[inline]
    const fn first(&self) -> u8 {
        self.src[self.cur]
    }

    /// Returns the byte after the cursor, if any.
    #[inline]
    fn second(&self) -> Option<u8> {
        self.src.get(self.cur + 1).copied()
    }

    #[inline]
    const fn has_next(&self) -> bool {
        self.cur < self.src.len()
    }
}

impl fmt::Display for Lexer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lexer = Lexer {
            src: self.src,
            cur: 0,
            line: 1,
            bol: 0,
        };

        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            writeln!(f, "{token}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = vec![];

        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            out.push(token.kind);
        }

        out
    }

    #[test]
    fn lexer_assignment() {
        assert_eq!(
            kinds("x = 10;"),
            vec![
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Int,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn lexer_operators_and_parens() {
        assert_eq!(
            kinds("(1 + 2) * 3 - 4 / 5"),
            vec![
                TokenKind::ParenOpen,
                TokenKind::Int,
                TokenKind::Plus,
                TokenKind::Int,
                TokenKind::ParenClose,
                TokenKind::Asterisk,
                TokenKind::Int,
                TokenKind::Minus,
                TokenKind::Int,
                TokenKind::Slash,
                TokenKind::Int,
            ]
        );
    }

    #[test]
    fn lexer_keywords() {
        assert_eq!(
            kinds("print true; print false;"),
            vec![
                TokenKind::Print,
                TokenKind::True,
                TokenKind::Semicolon,
                TokenKind::Print,
                TokenKind::False,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn lexer_keyword_prefix_is_ident() {
        let mut lexer = Lexer::new("printer true_ish");

        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Ident);
        assert_eq!(token.literal, "printer");

        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Ident);
        assert_eq!(token.literal, "true_ish");
    }

    #[test]
    fn lexer_comments() {
        assert_eq!(
            kinds("a // trailing\n/* block\nspanning */ b"),
            vec![
                TokenKind::Ident,
                TokenKind::LineComment,
                TokenKind::BlockComment,
                TokenKind::Ident,
            ]
        );
    }

    #[test]
    fn lexer_slash_is_division() {
        assert_eq!(
            kinds("8 / 2"),
            vec![TokenKind::Int, TokenKind::Slash, TokenKind::Int]
        );
    }

    #[test]
    fn lexer_positions() {
        let mut lexer = Lexer::new("x = 1;\n  y = 2;");

        let x = lexer.next_token();
        assert_eq!((x.line, x.col), (1, 1));

        // '='
        let _ = lexer.next_token();
        let one = lexer.next_token();
        assert_eq!((one.line, one.col), (1, 5));

        // ';'
        let _ = lexer.next_token();
        let y = lexer.next_token();
        assert_eq!((y.line, y.col), (2, 3));
    }

    #[test]
    fn lexer_illegal_byte() {
        let mut lexer = Lexer::new("@");
        let token = lexer.next_token();

        assert_eq!(token.kind, TokenKind::Illegal);
        assert_eq!(token.literal, "@");
    }

    #[test]
    fn lexer_eof_is_sticky() {
        let mut lexer = Lexer::new("1");
        let _ = lexer.next_token();

        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}
