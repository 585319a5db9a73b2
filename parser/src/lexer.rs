//! FILENAME: parser/src/lexer.rs
//! PURPOSE: Scans a raw formula string and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the parsing pipeline. The input is cut
//! at a fixed set of reserved characters: every reserved character is a token
//! of its own (adjacent ones are never merged) and every maximal run of other
//! characters is one token. Runs are trimmed; runs that are only whitespace
//! produce no token. Quotes are ordinary terminals here, the parser decides
//! what a quoted span means.
//!
//! RESERVED CHARACTERS: + - * / ( ) { } ; , " \
//!
//! CLASSIFICATION (first match wins):
//! 1. invariant floating-point number
//! 2. operation name known to the catalog (case-insensitive)
//! 3. constant name known to the catalog (case-insensitive)
//! 4. single reserved character
//! 5. identifier

use crate::catalog::OperationCatalog;
use crate::token::{Token, TokenKind};
use std::iter::Peekable;
use std::str::CharIndices;

/// The reserved characters, in the order they are documented.
pub const TERMINALS: [char; 12] = ['+', '-', '*', '/', '(', ')', '{', '}', ';', ',', '"', '\\'];

/// Returns true if `ch` is a reserved character.
pub fn is_terminal(ch: char) -> bool {
    TERMINALS.contains(&ch)
}

/// Parses `text` as an invariant-culture number.
/// Words that Rust would accept as floats ("inf", "NaN") are not numbers here.
pub fn parse_number(text: &str) -> Option<f64> {
    let first = text.chars().next()?;
    if !(first.is_ascii_digit() || first == '.') {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Lazy, single-pass tokenizer. Yields an `EndOfInput` token last, then stops.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    catalog: &'a OperationCatalog,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, catalog: &'a OperationCatalog) -> Self {
        Lexer {
            input,
            chars: input.char_indices().peekable(),
            catalog,
            finished: false,
        }
    }

    /// Advances the lexer and returns the next token.
    /// Once the input is exhausted this keeps returning `EndOfInput`.
    pub fn next_token(&mut self) -> Token {
        loop {
            let Some(&(start, ch)) = self.chars.peek() else {
                self.finished = true;
                return Token::end_of_input(self.input.len());
            };

            if is_terminal(ch) {
                self.chars.next();
                let end = start + ch.len_utf8();
                return self.classify(&self.input[start..end], start);
            }

            let end = self.read_run(start);
            let raw = &self.input[start..end];
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let offset = start + (raw.len() - raw.trim_start().len());
            return self.classify(trimmed, offset);
        }
    }

    /// Consumes a run of non-reserved characters and returns its end offset.
    fn read_run(&mut self, start: usize) -> usize {
        let mut end = start;
        while let Some(&(index, ch)) = self.chars.peek() {
            if is_terminal(ch) {
                break;
            }
            end = index + ch.len_utf8();
            self.chars.next();
        }
        end
    }

    fn classify(&self, text: &str, start: usize) -> Token {
        let kind = if parse_number(text).is_some() {
            TokenKind::Number
        } else if self.catalog.operation(text).is_some() {
            TokenKind::Operation
        } else if self.catalog.constant(text).is_some() {
            TokenKind::Constant
        } else if text.chars().count() == 1 && text.chars().all(is_terminal) {
            TokenKind::Terminal
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, text, start)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        Some(self.next_token())
    }
}
