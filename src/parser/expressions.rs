//! Expression parsing using precedence climbing.

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::TokenKind;

use super::core::{ParseResult, Parser};
use super::precedence::{get_precedence, Precedence};

impl Parser {
    pub(crate) fn expression(&mut self) -> ParseResult<Expr> {
        let lhs = self.unary()?;
        self.climb(lhs, Precedence::Equality)
    }

    /// Fold binary operators of at least `min_precedence` onto `lhs`.
    ///
    /// The right operand absorbs any following operators that bind strictly
    /// tighter than the current one; equal precedence goes back to the outer
    /// loop, which makes every operator left-associative.
    fn climb(&mut self, mut lhs: Expr, min_precedence: Precedence) -> ParseResult<Expr> {
        loop {
            let precedence = get_precedence(&self.peek().kind);
            if precedence == Precedence::None || precedence < min_precedence {
                break;
            }

            let operator = self.advance();
            let mut rhs = self.unary()?;

            loop {
                let next = get_precedence(&self.peek().kind);
                if next == Precedence::None || next <= precedence {
                    break;
                }
                rhs = self.climb(rhs, precedence.next())?;
            }

            lhs = Expr::binary(lhs, operator, rhs);
        }

        Ok(lhs)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.check(TokenKind::Minus) || self.check(TokenKind::Bang) {
            let operator = self.advance();
            let operand = self.nested(Self::unary)?;
            return Ok(Expr::unary(operator, operand));
        }

        self.primary()
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.is_at_end() {
            return Err(self.error_here("expression"));
        }

        let token = self.advance();
        let span = token.span;

        match token.kind {
            TokenKind::Number => {
                let value: f64 = token.text.parse().map_err(|_| {
                    ParserError::general(format!("Invalid number '{}'", token.text), span)
                })?;
                Ok(Expr::literal(Literal::Number(value), span))
            }
            TokenKind::String => Ok(Expr::literal(Literal::String(token.text), span)),
            TokenKind::True => Ok(Expr::literal(Literal::Bool(true), span)),
            TokenKind::False => Ok(Expr::literal(Literal::Bool(false), span)),
            TokenKind::Null => Ok(Expr::literal(Literal::Null, span)),
            TokenKind::Identifier => Ok(Expr::literal(Literal::Identifier(token.text), span)),

            TokenKind::LeftParen => {
                let expr = self.nested(Self::expression)?;
                self.expect(TokenKind::RightParen)?;
                let span = span.merge(&self.previous_span());
                Ok(Expr::new(ExprKind::Grouping(Box::new(expr)), span))
            }

            _ => Err(ParserError::unexpected_token(
                "expression",
                &token.text,
                span,
            )),
        }
    }
}
