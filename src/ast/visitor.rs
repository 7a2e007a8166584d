//! Node visitation.
//!
//! Each consumer of the tree (code generation, printing) implements [`Visitor`];
//! `accept` picks the method for the node's variant with a single exhaustive match.

use crate::ast::expr::{Expr, ExprKind, Literal};
use crate::ast::stmt::{Stmt, StmtKind};
use crate::lexer::Token;
use crate::span::Span;

pub trait Visitor {
    type Output;

    fn visit_literal(&mut self, literal: &Literal, span: Span) -> Self::Output;
    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Self::Output;
    fn visit_unary(&mut self, operator: &Token, operand: &Expr) -> Self::Output;
    fn visit_grouping(&mut self, inner: &Expr) -> Self::Output;

    fn visit_expression_stmt(&mut self, expr: &Expr) -> Self::Output;
    fn visit_let(&mut self, name: &str, initializer: &Expr, span: Span) -> Self::Output;
    fn visit_assign(&mut self, name: &str, value: &Expr, span: Span) -> Self::Output;
    fn visit_block(&mut self, statements: &[Stmt], span: Span) -> Self::Output;
}

impl Expr {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match &self.kind {
            ExprKind::Literal(literal) => visitor.visit_literal(literal, self.span),
            ExprKind::Binary {
                left,
                operator,
                right,
            } => visitor.visit_binary(left, operator, right),
            ExprKind::Unary { operator, operand } => visitor.visit_unary(operator, operand),
            ExprKind::Grouping(inner) => visitor.visit_grouping(inner),
        }
    }
}

impl Stmt {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match &self.kind {
            StmtKind::Expression(expr) => visitor.visit_expression_stmt(expr),
            StmtKind::Let { name, initializer } => visitor.visit_let(name, initializer, self.span),
            StmtKind::Assign { name, value } => visitor.visit_assign(name, value, self.span),
            StmtKind::Block(statements) => visitor.visit_block(statements, self.span),
        }
    }
}
