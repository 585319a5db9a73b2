//! FILENAME: parser/src/token.rs
//! PURPOSE: Token definitions for the formula lexer.
//! CONTEXT: Tokens are the atomic units produced by the lexer and consumed by the parser.
//! Every token remembers where it came from so the parser can report precise positions.

use crate::ast::Span;

/// Classification assigned to a token when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    /// Case-insensitive match against a catalog operation name.
    Operation,
    /// Case-insensitive match against a catalog constant name.
    Constant,
    Identifier,
    /// A single reserved character.
    Terminal,
    EndOfInput,
}

/// A token: its kind, trimmed source text and source location (byte offsets).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub length: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize) -> Self {
        let text = text.into();
        let length = text.len();
        Token {
            kind,
            text,
            start,
            length,
        }
    }

    pub fn end_of_input(offset: usize) -> Self {
        Token {
            kind: TokenKind::EndOfInput,
            text: String::new(),
            start: offset,
            length: 0,
        }
    }

    /// Byte offset just past the token.
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.length)
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }

    /// True if the token is exactly the given reserved character.
    /// Compares text rather than kind: `+` and `-` classify as operations
    /// when the catalog knows them, yet still act as grammar symbols.
    pub fn is_symbol(&self, symbol: char) -> bool {
        let mut chars = self.text.chars();
        chars.next() == Some(symbol) && chars.next().is_none()
    }

    /// True if the token is any single reserved character.
    pub fn is_reserved(&self) -> bool {
        let mut chars = self.text.chars();
        matches!(chars.next(), Some(c) if crate::lexer::is_terminal(c)) && chars.next().is_none()
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => write!(f, "end of formula"),
            _ => write!(f, "'{}'", self.text),
        }
    }
}
