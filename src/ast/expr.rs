//! Expression AST nodes.

use crate::lexer::Token;
use crate::span::Span;

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn literal(literal: Literal, span: Span) -> Self {
        Self::new(ExprKind::Literal(literal), span)
    }

    pub fn binary(left: Expr, operator: Token, right: Expr) -> Self {
        let span = left.span.merge(&right.span);
        Self::new(
            ExprKind::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            },
            span,
        )
    }

    pub fn unary(operator: Token, operand: Expr) -> Self {
        let span = operator.span.merge(&operand.span);
        Self::new(
            ExprKind::Unary {
                operator,
                operand: Box::new(operand),
            },
            span,
        )
    }

    /// The identifier name if this is a bare variable reference.
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Literal(Literal::Identifier(name)) => Some(name),
            _ => None,
        }
    }
}

/// All expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Literal or variable reference: 42, "hi", true, null, x
    Literal(Literal),

    /// Binary operation: a + b
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Unary operation: -x, !x
    Unary { operator: Token, operand: Box<Expr> },

    /// Grouping expression: (expr)
    Grouping(Box<Expr>),
}

/// Literal values. Identifiers are literals that name a variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
    Identifier(String),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "null"),
            Literal::Identifier(name) => write!(f, "{}", name),
        }
    }
}
