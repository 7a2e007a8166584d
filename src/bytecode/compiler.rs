//! Bytecode compiler: transforms AST into bytecode.
//!
//! Single pass over the tree through [`Visitor`]. Every operand is an
//! explicit pool index written right after its opcode.

use crate::ast::{Expr, Literal, Stmt, Visitor};
use crate::bytecode::chunk::{BytecodeProgram, Constant};
use crate::bytecode::instruction::OpCode;
use crate::error::CompileError;
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// The bytecode compiler.
#[derive(Debug, Default)]
pub struct Compiler {
    program: BytecodeProgram,
}

impl Compiler {
    /// Create a new compiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile one statement, appending to the program built so far.
    pub fn compile(&mut self, stmt: &Stmt) -> CompileResult<()> {
        stmt.accept(self)
    }

    pub fn compile_program(&mut self, statements: &[Stmt]) -> CompileResult<()> {
        for stmt in statements {
            self.compile(stmt)?;
        }
        tracing::debug!(
            bytes = self.program.len(),
            constants = self.program.constants.len(),
            labels = self.program.labels.len(),
            "compiled program"
        );
        Ok(())
    }

    pub fn bytecode(&self) -> &BytecodeProgram {
        &self.program
    }

    pub fn into_bytecode(self) -> BytecodeProgram {
        self.program
    }

    // ===== Emission helpers =====

    fn emit_op(&mut self, op: OpCode, line: usize) {
        self.program.write_op(op, line);
    }

    fn emit_with_operand(&mut self, op: OpCode, operand: u16, line: usize) {
        self.program.write_op(op, line);
        self.program.write_u16(operand, line);
    }

    fn emit_constant(&mut self, constant: Constant, span: Span) -> CompileResult<()> {
        let index = self.program.add_constant(constant, span)?;
        self.emit_with_operand(OpCode::Constant, index, span.line);
        Ok(())
    }

    fn emit_variable(&mut self, op: OpCode, name: &str, span: Span) -> CompileResult<()> {
        let label = self.program.add_label(name, span)?;
        self.emit_with_operand(op, label, span.line);
        Ok(())
    }
}

fn binary_opcode(operator: &Token) -> OpCode {
    match operator.kind {
        TokenKind::Plus => OpCode::Add,
        TokenKind::Minus => OpCode::Subtract,
        TokenKind::Star => OpCode::Multiply,
        TokenKind::Slash => OpCode::Divide,
        TokenKind::EqualEqual => OpCode::Equal,
        TokenKind::BangEqual => OpCode::NotEqual,
        TokenKind::Less => OpCode::Less,
        TokenKind::LessEqual => OpCode::LessEqual,
        TokenKind::Greater => OpCode::Greater,
        TokenKind::GreaterEqual => OpCode::GreaterEqual,
        _ => OpCode::Nop,
    }
}

fn unary_opcode(operator: &Token) -> OpCode {
    match operator.kind {
        TokenKind::Minus => OpCode::Negate,
        TokenKind::Bang => OpCode::Not,
        _ => OpCode::Nop,
    }
}

impl Visitor for Compiler {
    type Output = CompileResult<()>;

    fn visit_literal(&mut self, literal: &Literal, span: Span) -> CompileResult<()> {
        let constant = match literal {
            Literal::Number(n) => Constant::Number(*n),
            Literal::String(s) => Constant::String(s.clone()),
            Literal::Bool(b) => Constant::Boolean(*b),
            Literal::Null => Constant::Null,
            Literal::Identifier(name) => {
                return self.emit_variable(OpCode::GetVariable, name, span);
            }
        };
        self.emit_constant(constant, span)
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> CompileResult<()> {
        left.accept(self)?;
        right.accept(self)?;
        self.emit_op(binary_opcode(operator), operator.line());
        Ok(())
    }

    fn visit_unary(&mut self, operator: &Token, operand: &Expr) -> CompileResult<()> {
        operand.accept(self)?;
        self.emit_op(unary_opcode(operator), operator.line());
        Ok(())
    }

    fn visit_grouping(&mut self, inner: &Expr) -> CompileResult<()> {
        inner.accept(self)
    }

    fn visit_expression_stmt(&mut self, expr: &Expr) -> CompileResult<()> {
        expr.accept(self)?;
        self.emit_op(OpCode::Pop, expr.span.line);
        Ok(())
    }

    fn visit_let(&mut self, name: &str, initializer: &Expr, span: Span) -> CompileResult<()> {
        initializer.accept(self)?;
        self.emit_variable(OpCode::DefineVariable, name, span)
    }

    fn visit_assign(&mut self, name: &str, value: &Expr, span: Span) -> CompileResult<()> {
        value.accept(self)?;
        self.emit_variable(OpCode::SetVariable, name, span)
    }

    fn visit_block(&mut self, statements: &[Stmt], span: Span) -> CompileResult<()> {
        self.emit_op(OpCode::EnterScope, span.line);
        for stmt in statements {
            stmt.accept(self)?;
        }
        self.emit_op(OpCode::LeaveScope, span.line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn compile_source(source: &str) -> BytecodeProgram {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        let mut compiler = Compiler::new();
        compiler.compile_program(&program.statements).unwrap();
        compiler.into_bytecode()
    }

    fn op(code: OpCode) -> u8 {
        code.into()
    }

    #[test]
    fn test_compile_simple_expression() {
        let program = compile_source("1 + 2");
        assert_eq!(
            program.code,
            vec![
                op(OpCode::Constant),
                0,
                0,
                op(OpCode::Constant),
                0,
                1,
                op(OpCode::Add),
                op(OpCode::Pop),
            ]
        );
        assert_eq!(
            program.constants,
            vec![Constant::Number(1.0), Constant::Number(2.0)]
        );
    }

    #[test]
    fn test_grouping_emits_nothing() {
        assert_eq!(compile_source("(1 + 2)").code, compile_source("1 + 2").code);
    }

    #[test]
    fn test_compile_variable() {
        let program = compile_source("let x = 42\nx = x");
        assert_eq!(
            program.code,
            vec![
                op(OpCode::Constant),
                0,
                0,
                op(OpCode::DefineVariable),
                0,
                0,
                op(OpCode::GetVariable),
                0,
                0,
                op(OpCode::SetVariable),
                0,
                0,
            ]
        );
        assert_eq!(program.labels, vec!["x"]);
        assert_eq!(program.lines[9], 2);
    }

    #[test]
    fn test_block_scopes() {
        let program = compile_source("{ true }");
        assert_eq!(program.code.first(), Some(&op(OpCode::EnterScope)));
        assert_eq!(program.code.last(), Some(&op(OpCode::LeaveScope)));
        assert_eq!(program.constants, vec![Constant::Boolean(true)]);
    }

    #[test]
    fn test_unary_ops_are_distinct() {
        assert_eq!(compile_source("-1").code[3], op(OpCode::Negate));
        assert_eq!(compile_source("!1").code[3], op(OpCode::Not));
    }

    #[test]
    fn test_unknown_operator_emits_nop() {
        let span = Span::new(0, 1, 1, 1);
        let operand = Expr::literal(Literal::Number(1.0), span);
        let expr = Expr::binary(
            operand.clone(),
            Token::new(TokenKind::Comma, ",", span),
            operand,
        );
        let mut compiler = Compiler::new();
        expr.accept(&mut compiler).unwrap();
        assert_eq!(compiler.bytecode().code.last(), Some(&op(OpCode::Nop)));
    }
}
