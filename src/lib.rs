//! Genesis: a small scripting language with a token-level preprocessor and a
//! bytecode virtual machine.
//!
//! This is the library root that exports all modules.
//!
//! # Pipeline
//!
//! source → [`lexer`] → [`preprocessor`] → [`parser`] → [`bytecode::Compiler`]
//! → [`bytecode::Vm`]. Each stage stops at its first error.

#![allow(clippy::result_large_err)]

pub mod ast;
pub mod bytecode;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod preprocessor;
pub mod span;

use tracing::info;

use ast::Program;
use bytecode::{BytecodeProgram, Constant, Scope};
use error::{GenesisError, ProcessError};
use lexer::{ScanOutput, Scanner, Token};
use preprocessor::{DefineTable, Preprocessor};

/// What the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Execute the program (default)
    #[default]
    Run,
    /// Stop after preprocessing and dump the tokens
    Tokens,
    /// Stop after parsing and dump the AST
    Ast,
    /// Stop after compilation and dump the bytecode
    Bytecode,
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub mode: OutputMode,
    /// Names bound before the first `@define` in the source is seen.
    pub defines: DefineTable,
}

impl PipelineOptions {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            defines: DefineTable::new(),
        }
    }

    pub fn with_define(mut self, name: impl Into<String>, value: Token) -> Self {
        self.defines.define(name, value);
        self
    }
}

/// Outcome of executing a program.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Value of the last expression statement, if any ran.
    pub value: Option<Constant>,
    /// Outer-scope bindings after the run, in definition order.
    pub bindings: Scope,
}

impl std::fmt::Display for Execution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(value) = &self.value {
            writeln!(f, "{}", value)?;
        }
        for (name, value) in &self.bindings {
            writeln!(f, "{} = {}", name, value)?;
        }
        Ok(())
    }
}

/// Lex and preprocess `source` with no predefined names.
pub fn tokenize(source: &str) -> Result<Vec<Token>, GenesisError> {
    preprocess(source, &DefineTable::new())
}

/// Lex `source` and evaluate its directives, starting from `defines`.
pub fn preprocess(source: &str, defines: &DefineTable) -> Result<Vec<Token>, GenesisError> {
    info!("pipeline: start lex");
    let ScanOutput { tokens, directives } = Scanner::new(source).scan()?;

    info!("pipeline: start preprocess");
    let tokens = Preprocessor::new(tokens, directives)
        .with_defines(defines.clone())
        .process()?;
    Ok(tokens)
}

/// Run the front end and the parser.
pub fn parse(source: &str) -> Result<Program, GenesisError> {
    parse_tokens(tokenize(source)?)
}

fn parse_tokens(tokens: Vec<Token>) -> Result<Program, GenesisError> {
    info!("pipeline: start parse");
    Ok(parser::Parser::new(tokens).parse()?)
}

/// Compile `source` to bytecode.
pub fn compile(source: &str) -> Result<BytecodeProgram, GenesisError> {
    compile_program(&parse(source)?)
}

fn compile_program(program: &Program) -> Result<BytecodeProgram, GenesisError> {
    info!("pipeline: start compile");
    let mut compiler = bytecode::Compiler::new();
    compiler.compile_program(&program.statements)?;
    Ok(compiler.into_bytecode())
}

/// Compile and execute `source`.
pub fn run(source: &str) -> Result<Execution, GenesisError> {
    execute(&compile(source)?)
}

fn execute(program: &BytecodeProgram) -> Result<Execution, GenesisError> {
    info!("pipeline: start execute");
    let mut vm = bytecode::Vm::new();
    let value = vm.run(program)?;
    Ok(Execution {
        value,
        bindings: vm.bindings().clone(),
    })
}

/// Run the pipeline as far as `options.mode` asks and render its output.
pub fn run_with_options(source: &str, options: &PipelineOptions) -> Result<String, GenesisError> {
    info!("pipeline: starting with mode {:?}", options.mode);

    let tokens = preprocess(source, &options.defines)?;
    if options.mode == OutputMode::Tokens {
        return Ok(dump_tokens(&tokens));
    }

    let program = parse_tokens(tokens)?;
    if options.mode == OutputMode::Ast {
        return Ok(ast::print_program(&program.statements));
    }

    let bytecode = compile_program(&program)?;
    if options.mode == OutputMode::Bytecode {
        return Ok(bytecode::disassemble(&bytecode));
    }

    Ok(execute(&bytecode)?.to_string())
}

/// One line per token: position, kind and lexeme.
pub fn dump_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&format!(
            "{:>4}:{:<3} {:<12} {}\n",
            token.line(),
            token.column(),
            format!("{:?}", token.kind),
            token.text
        ));
    }
    out
}

/// Parse a `NAME=VALUE` predefinition. `VALUE` must lex to a single literal.
pub fn parse_define(definition: &str) -> Result<(String, Token), GenesisError> {
    let malformed =
        |message: &str| ProcessError::malformed("-D", message, span::Span::new(0, 0, 1, 1));

    let (name, value) = definition
        .split_once('=')
        .ok_or_else(|| malformed("expected NAME=VALUE"))?;

    let name = name.trim();
    let mut name_tokens = Scanner::new(name).scan_tokens()?;
    name_tokens.pop();
    match name_tokens.as_slice() {
        [token] if token.kind == lexer::TokenKind::Identifier => {}
        _ => return Err(malformed("name must be an identifier").into()),
    }

    let mut value_tokens = Scanner::new(value.trim()).scan_tokens()?;
    value_tokens.pop();
    match value_tokens.pop() {
        Some(token) if value_tokens.is_empty() && token.kind.is_literal() => {
            Ok((name.to_string(), token))
        }
        _ => Err(malformed("value must be a single literal").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_run_reports_value_and_bindings() {
        let execution = run("let a = 2\nlet b = a * 3\nb - 1").unwrap();
        assert_eq!(execution.value, Some(Constant::Number(5.0)));
        assert_eq!(execution.to_string(), "5\na = 2\nb = 6\n");
    }

    #[test]
    fn test_modes_stop_early() {
        let source = "let x = 1 +";
        // The parse error only surfaces once the parser runs.
        assert!(run_with_options(source, &PipelineOptions::new(OutputMode::Tokens)).is_ok());
        assert!(matches!(
            run_with_options(source, &PipelineOptions::new(OutputMode::Ast)),
            Err(GenesisError::Parser(_))
        ));
    }

    #[test]
    fn test_seeded_define_selects_branch() {
        let (name, value) = parse_define("DEBUG=true").unwrap();
        let options = PipelineOptions::new(OutputMode::Run).with_define(name, value);
        let output =
            run_with_options("@if (DEBUG) 1 @else 2 @end", &options).unwrap();
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_parse_define_rejects_bad_input() {
        assert!(parse_define("DEBUG").is_err());
        assert!(parse_define("1=2").is_err());
        assert!(parse_define("X=a").is_err());
        assert!(parse_define("X=1 2").is_err());
        let (name, value) = parse_define(" MODE = \"fast\" ").unwrap();
        assert_eq!(name, "MODE");
        assert_eq!(value.text, "fast");
    }

    #[test]
    fn test_dump_tokens() {
        assert_eq!(
            dump_tokens(&tokenize("a<=b").unwrap()),
            "   1:1   Identifier   a\n   1:2   LessEqual    <=\n   1:4   Identifier   b\n   1:5   Eof          \n"
        );
    }

    #[test]
    fn test_error_line_is_reported() {
        let err = run("let a = 1\nlet b = a + true").unwrap_err();
        assert!(matches!(err, GenesisError::Runtime(_)));
        assert_eq!(err.line(), Some(2));
    }
}
