//! FILENAME: parser/src/parser.rs
//! PURPOSE: Recursive descent parser that converts a stream of Tokens into an AST.
//! CONTEXT: This is the second stage of the parsing pipeline. It takes tokens
//! from the Lexer, binds function names and constants through the catalog,
//! hands braced references to a PathResolver and builds an Expression tree.
//!
//! GRAMMAR:
//!   expression   --> term ( ("+" | "-") term )*
//!   term         --> factor ( ("*" | "/") factor )*
//!   factor       --> ["+" | "-"] operand
//!   operand      --> NUMBER | CONSTANT | function | "(" expression ")" | "{" reference "}"
//!   function     --> OPERATION "(" [ arguments ] ")"
//!   arguments    --> expression ( ("," | ";") expression )*
//!   reference    --> ["/"] [ segment ( "/" segment )* ] [ "(" KEY ")" ]
//!   segment      --> NAME | '"' any-tokens '"'

use crate::ast::{Expression, ExpressionKind};
use crate::catalog::OperationCatalog;
use crate::error::{ParseResult, SyntaxError};
use crate::lexer::Lexer;
use crate::path_resolver::PathResolver;
use crate::token::{Token, TokenKind};

/// The Parser holds the lexer and current token state.
pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current_token: Token,
    catalog: &'a OperationCatalog,
    resolver: &'a dyn PathResolver,
}

impl<'a> Parser<'a> {
    /// Creates a new parser and advances to the first token.
    pub fn new(
        input: &'a str,
        catalog: &'a OperationCatalog,
        resolver: &'a dyn PathResolver,
    ) -> Self {
        let mut lexer = Lexer::new(input, catalog);
        let current_token = lexer.next_token();
        Parser {
            input,
            lexer,
            current_token,
            catalog,
            resolver,
        }
    }

    /// Parses the entire input and returns the AST.
    pub fn parse(&mut self) -> ParseResult<Expression> {
        let expr = self.parse_expression()?;

        if !self.current_token.is_end() {
            return Err(self.unexpected("Unexpected token after expression"));
        }

        Ok(expr)
    }

    fn advance(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    /// Consumes the expected reserved character or fails at the current token.
    fn expect(&mut self, symbol: char) -> ParseResult<Token> {
        if self.current_token.is_symbol(symbol) {
            let token = self.current_token.clone();
            self.advance();
            Ok(token)
        } else {
            Err(self.unexpected(&format!("Expected '{}'", symbol)))
        }
    }

    fn unexpected(&self, context: &str) -> SyntaxError {
        SyntaxError::new(
            format!("{}, found {}", context, self.current_token),
            self.current_token.start,
        )
    }

    /// Parses additive expressions (+ and -), left-associative.
    fn parse_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_term()?;

        while self.current_token.is_symbol('+') || self.current_token.is_symbol('-') {
            let operator = self.current_token.clone();
            self.advance();
            let right = self.parse_term()?;
            left = self.binary(&operator, left, right)?;
        }

        Ok(left)
    }

    /// Parses multiplicative expressions (* and /), left-associative.
    fn parse_term(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_factor()?;

        while self.current_token.is_symbol('*') || self.current_token.is_symbol('/') {
            let operator = self.current_token.clone();
            self.advance();
            let right = self.parse_factor()?;
            left = self.binary(&operator, left, right)?;
        }

        Ok(left)
    }

    fn binary(&self, operator: &Token, left: Expression, right: Expression) -> ParseResult<Expression> {
        let operation = self.catalog.operation(&operator.text).ok_or_else(|| {
            SyntaxError::new(
                format!("Operator '{}' is not available", operator.text),
                operator.start,
            )
        })?;
        let span = left.span.to(right.span);
        Ok(Expression::function(operation.clone(), vec![left, right], span))
    }

    /// Parses an optional sign followed by an operand.
    fn parse_factor(&mut self) -> ParseResult<Expression> {
        if self.current_token.is_symbol('-') {
            let sign = self.current_token.span();
            self.advance();
            let operand = self.parse_operand()?;
            let span = sign.to(operand.span);
            return Ok(Expression::negate(operand, span));
        }

        if self.current_token.is_symbol('+') {
            self.advance();
        }

        self.parse_operand()
    }

    fn parse_operand(&mut self) -> ParseResult<Expression> {
        let token = self.current_token.clone();

        if token.is_symbol('(') {
            self.advance();
            let inner = self.parse_expression()?;
            let close = self.expect(')')?;
            // The group's span includes its parentheses; the node itself is unchanged.
            return Ok(Expression::new(inner.kind, token.span().to(close.span())));
        }

        if token.is_symbol('{') {
            return self.parse_reference();
        }

        let kind = token.kind;
        match kind {
            TokenKind::Number => {
                self.advance();
                let value = crate::lexer::parse_number(&token.text)
                    .ok_or_else(|| SyntaxError::new("Invalid number", token.start))?;
                Ok(Expression::number(value, token.span()))
            }

            TokenKind::Constant => {
                self.advance();
                let constant = self.catalog.constant(&token.text).ok_or_else(|| {
                    SyntaxError::new(format!("Unknown constant '{}'", token.text), token.start)
                })?;
                Ok(Expression::new(
                    ExpressionKind::Constant {
                        name: constant.name.clone(),
                        value: constant.value,
                    },
                    token.span(),
                ))
            }

            TokenKind::Operation if !token.is_reserved() => self.parse_function_call(token),

            TokenKind::Identifier => {
                self.advance();
                if self.current_token.is_symbol('(') {
                    Err(SyntaxError::new(
                        format!("Unknown function '{}'", token.text),
                        token.start,
                    ))
                } else {
                    Err(SyntaxError::new(
                        format!("Unexpected identifier '{}'", token.text),
                        token.start,
                    ))
                }
            }

            TokenKind::EndOfInput => Err(self.unexpected("Unexpected end of expression")),

            _ => Err(self.unexpected("Expected a value")),
        }
    }

    /// Parses a function call like max({a}; {b}; 10).
    fn parse_function_call(&mut self, name: Token) -> ParseResult<Expression> {
        let operation = self
            .catalog
            .operation(&name.text)
            .cloned()
            .ok_or_else(|| SyntaxError::new(format!("Unknown function '{}'", name.text), name.start))?;

        self.advance();
        self.expect('(')?;

        let mut args = Vec::new();

        if !self.current_token.is_symbol(')') {
            args.push(self.parse_expression()?);

            while self.current_token.is_symbol(',') || self.current_token.is_symbol(';') {
                self.advance();
                args.push(self.parse_expression()?);
            }
        }

        let close = self.expect(')')?;

        let arity = operation.arity();
        if !arity.accepts(args.len()) {
            return Err(SyntaxError::new(
                format!(
                    "Function '{}' expects {} argument(s), got {}",
                    operation.name(),
                    arity,
                    args.len()
                ),
                name.start,
            ));
        }

        Ok(Expression::function(operation, args, name.span().to(close.span())))
    }

    /// Parses a braced reference: {Char}, {../Part/"Char 1"}, {/Part/Char(17)}.
    fn parse_reference(&mut self) -> ParseResult<Expression> {
        let open = self.expect('{')?;
        let path_start = self.current_token.start;
        let mut path_end = path_start;
        let mut expect_segment = true;

        if self.current_token.is_symbol('/') {
            path_end = self.current_token.end();
            self.advance();
            // "{/}" is the root itself.
            expect_segment = !self.current_token.is_symbol('}') && !self.current_token.is_symbol('(');
        }

        while expect_segment {
            path_end = self.parse_segment()?;

            if self.current_token.is_symbol('/') {
                path_end = self.current_token.end();
                self.advance();
            } else {
                expect_segment = false;
            }
        }

        let attribute = if self.current_token.is_symbol('(') {
            self.advance();
            let key = self.parse_attribute_key()?;
            self.expect(')')?;
            Some(key)
        } else {
            None
        };

        let close = self.expect('}')?;

        let raw = &self.input[path_start..path_end];
        let path = self.resolver.resolve(raw).ok_or_else(|| {
            SyntaxError::new(format!("Cannot resolve path '{}'", raw), path_start)
        })?;

        Ok(Expression::characteristic(path, attribute, open.span().to(close.span())))
    }

    /// Consumes one path segment and returns the byte offset just past it.
    fn parse_segment(&mut self) -> ParseResult<usize> {
        if self.current_token.is_symbol('"') {
            let open = self.current_token.start;
            self.advance();
            while !self.current_token.is_symbol('"') {
                if self.current_token.is_end() {
                    return Err(SyntaxError::new("Unterminated quoted path segment", open));
                }
                self.advance();
            }
            let end = self.current_token.end();
            self.advance();
            return Ok(end);
        }

        let token = &self.current_token;
        let is_name = matches!(
            token.kind,
            TokenKind::Identifier | TokenKind::Number | TokenKind::Operation | TokenKind::Constant
        ) && !token.is_reserved();

        if !is_name {
            return Err(self.unexpected("Expected path segment"));
        }

        let end = token.end();
        self.advance();
        Ok(end)
    }

    fn parse_attribute_key(&mut self) -> ParseResult<u16> {
        let token = self.current_token.clone();
        if token.kind != TokenKind::Number {
            return Err(self.unexpected("Expected attribute key"));
        }
        let key = token.text.parse::<u16>().map_err(|_| {
            SyntaxError::new(format!("Invalid attribute key '{}'", token.text), token.start)
        })?;
        self.advance();
        Ok(key)
    }
}

/// Convenience function to parse a formula string directly.
pub fn parse(
    input: &str,
    catalog: &OperationCatalog,
    resolver: &dyn PathResolver,
) -> ParseResult<Expression> {
    let mut parser = Parser::new(input, catalog, resolver);
    parser
        .parse()
        .inspect_err(|e| log::debug!(target: "FORMULA", "rejected formula '{}': {}", input, e))
}
