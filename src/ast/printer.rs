//! Human-readable AST dump.

use crate::ast::expr::{Expr, Literal};
use crate::ast::stmt::Stmt;
use crate::ast::visitor::Visitor;
use crate::lexer::Token;
use crate::span::Span;

/// Renders statements one per line, indenting block contents with tabs.
#[derive(Debug, Default)]
pub struct AstPrinter {
    depth: usize,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }
}

/// Dump a whole program, one top-level statement per line.
pub fn print_program(statements: &[Stmt]) -> String {
    let mut printer = AstPrinter::new();
    let mut out = String::new();
    for stmt in statements {
        out.push_str(&printer.print(stmt));
        out.push('\n');
    }
    out
}

impl Visitor for AstPrinter {
    type Output = String;

    fn visit_literal(&mut self, literal: &Literal, _span: Span) -> String {
        literal.to_string()
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> String {
        format!(
            "Binary: ({} {} {})",
            left.accept(self),
            operator.text,
            right.accept(self)
        )
    }

    fn visit_unary(&mut self, operator: &Token, operand: &Expr) -> String {
        format!("Unary: ({}{})", operator.text, operand.accept(self))
    }

    fn visit_grouping(&mut self, inner: &Expr) -> String {
        format!("Group: ({})", inner.accept(self))
    }

    fn visit_expression_stmt(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    fn visit_let(&mut self, name: &str, initializer: &Expr, _span: Span) -> String {
        format!("Let: {} = {}", name, initializer.accept(self))
    }

    fn visit_assign(&mut self, name: &str, value: &Expr, _span: Span) -> String {
        format!("Assign: {} = {}", name, value.accept(self))
    }

    fn visit_block(&mut self, statements: &[Stmt], _span: Span) -> String {
        let mut out = String::from("Block: {\n");
        self.depth += 1;
        for stmt in statements {
            out.push_str(&"\t".repeat(self.depth));
            out.push_str(&stmt.accept(self));
            out.push('\n');
        }
        self.depth -= 1;
        out.push_str(&"\t".repeat(self.depth));
        out.push('}');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn dump(source: &str) -> String {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        print_program(&program.statements)
    }

    #[test]
    fn test_expression_dump() {
        assert_eq!(dump("1 + 2 * 3"), "Binary: (1 + Binary: (2 * 3))\n");
        assert_eq!(dump("-(x)"), "Unary: (-Group: (x))\n");
    }

    #[test]
    fn test_statement_dump() {
        assert_eq!(
            dump("let x = 1\nx = \"a\""),
            "Let: x = 1\nAssign: x = \"a\"\n"
        );
    }

    #[test]
    fn test_nested_block_indentation() {
        assert_eq!(
            dump("{ let a = true { a } }"),
            "Block: {\n\tLet: a = true\n\tBlock: {\n\t\ta\n\t}\n}\n"
        );
    }
}
