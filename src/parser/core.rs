//! Core parser struct and helper methods.

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

pub type ParseResult<T> = Result<T, ParserError>;

/// Deepest allowed nesting of groupings, unary operators and blocks.
pub const MAX_NESTING_DEPTH: usize = 200;

/// The parser for Genesis.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            // Place the end marker just past the last token.
            let (position, line, column) = tokens
                .last()
                .map(|t| {
                    let width = t.span.end - t.span.start;
                    (t.span.end, t.span.line, t.span.column + width)
                })
                .unwrap_or((0, 1, 1));
            tokens.push(Token::eof(position, line, column));
        }
        Self {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    /// Parse a complete program.
    pub fn parse(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        tracing::debug!(statements = statements.len(), "parsed program");
        Ok(Program::new(statements))
    }

    /// Run `parse` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParserError::general(
                format!("Nesting deeper than {} levels", MAX_NESTING_DEPTH),
                self.current_span(),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ===== Token manipulation =====

    pub(crate) fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.tokens[self.current.saturating_sub(1)].clone()
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn previous(&self) -> Option<&Token> {
        self.current.checked_sub(1).map(|index| &self.tokens[index])
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!("'{}'", kind)))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> ParseResult<String> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance().text)
        } else {
            Err(self.error_here("identifier"))
        }
    }

    /// Error for the current token not being `expected`.
    pub(crate) fn error_here(&self, expected: impl Into<String>) -> ParserError {
        if self.is_at_end() {
            ParserError::unexpected_eof(expected, self.current_span())
        } else {
            ParserError::unexpected_token(expected, &self.peek().text, self.current_span())
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn previous_span(&self) -> Span {
        self.previous().map(|t| t.span).unwrap_or_default()
    }
}
