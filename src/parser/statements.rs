//! Statement parsing: declarations, assignments, blocks.

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::TokenKind;

use super::core::{ParseResult, Parser};

impl Parser {
    pub(crate) fn declaration(&mut self) -> ParseResult<Stmt> {
        let stmt = if self.check(TokenKind::Let) {
            self.let_declaration()?
        } else if self.check(TokenKind::LeftBrace) {
            self.block_statement()?
        } else {
            self.expression_statement()?
        };

        // Statements may be terminated by an optional semicolon.
        self.match_token(TokenKind::Semicolon);
        Ok(stmt)
    }

    fn let_declaration(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        self.expect(TokenKind::Let)?;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Equal)?;
        let initializer = self.expression()?;
        let span = start_span.merge(&initializer.span);

        Ok(Stmt::new(StmtKind::Let { name, initializer }, span))
    }

    fn block_statement(&mut self) -> ParseResult<Stmt> {
        let start_span = self.current_span();
        self.expect(TokenKind::LeftBrace)?;

        let statements = self.nested(|parser| {
            let mut statements = Vec::new();
            while !parser.check(TokenKind::RightBrace) && !parser.is_at_end() {
                statements.push(parser.declaration()?);
            }
            Ok(statements)
        })?;

        self.expect(TokenKind::RightBrace)?;
        let span = start_span.merge(&self.previous_span());
        Ok(Stmt::new(StmtKind::Block(statements), span))
    }

    /// An expression, or an assignment when the expression is a bare name
    /// followed by `=`.
    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;

        if !self.check(TokenKind::Equal) {
            let span = expr.span;
            return Ok(Stmt::new(StmtKind::Expression(expr), span));
        }

        let follows_identifier = self
            .previous()
            .is_some_and(|t| t.kind == TokenKind::Identifier);
        let name = match expr.as_identifier() {
            Some(name) if follows_identifier => name.to_string(),
            _ => return Err(ParserError::invalid_assignment_target(expr.span)),
        };

        self.expect(TokenKind::Equal)?;
        let value = self.expression()?;
        let span = expr.span.merge(&value.span);
        Ok(Stmt::new(StmtKind::Assign { name, value }, span))
    }
}
