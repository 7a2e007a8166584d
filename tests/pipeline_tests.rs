//! End-to-end tests over the public pipeline API.

use genesis::bytecode::Constant;
use genesis::error::{GenesisError, LexerError, ParserError, ProcessError, RuntimeError};
use genesis::lexer::{Scanner, TokenKind};
use genesis::{compile, parse, run, run_with_options, tokenize, OutputMode, PipelineOptions};
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    Scanner::new(source)
        .scan_tokens()
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn texts(source: &str) -> Vec<String> {
    tokenize(source)
        .unwrap()
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.text)
        .collect()
}

fn value(source: &str) -> Option<Constant> {
    run(source).unwrap().value
}

#[test]
fn two_character_operators_lex_as_one_token() {
    for (source, op) in [
        ("a<=b", TokenKind::LessEqual),
        ("a>=b", TokenKind::GreaterEqual),
        ("a==b", TokenKind::EqualEqual),
        ("a!=b", TokenKind::BangEqual),
    ] {
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Identifier,
                op,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }
}

#[test]
fn relexing_joined_texts_preserves_kinds() {
    let source = "let total = (alpha+2.5)*beta-1e3/gamma\n{ x = !y <= z != true }; null >= 7";
    let tokens = Scanner::new(source).scan_tokens().unwrap();
    let joined = tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(kinds(&joined), kinds(source));
}

#[test]
fn precedence_and_associativity() {
    assert_eq!(
        genesis::run_with_options("1 + 2 * 3", &PipelineOptions::new(OutputMode::Ast)).unwrap(),
        "Binary: (1 + Binary: (2 * 3))\n"
    );
    assert_eq!(
        genesis::run_with_options("1 - 2 - 3", &PipelineOptions::new(OutputMode::Ast)).unwrap(),
        "Binary: (Binary: (1 - 2) - 3)\n"
    );
    assert_eq!(value("1 - 2 - 3"), Some(Constant::Number(-4.0)));
    assert_eq!(value("2 * 3 + 4 * 5"), Some(Constant::Number(26.0)));
}

#[test]
fn false_define_selects_else_branch() {
    assert_eq!(
        texts("@define X = false @if (X) let a = 1 @else let b = 2 @end"),
        vec!["let", "b", "=", "2"]
    );
}

#[test]
fn nested_conditional_in_taken_branch() {
    let source = "@define A = true\n@define B = null\n\
                  @if (A) @if (B) 1 @else 2 @end @else 3 @end";
    assert_eq!(texts(source), vec!["2"]);
    assert_eq!(value(source), Some(Constant::Number(2.0)));
}

#[test]
fn preprocessor_errors() {
    assert!(matches!(
        tokenize("@if (MISSING) 1 @end"),
        Err(GenesisError::Process(ProcessError::UndefinedName(..)))
    ));
    assert!(matches!(
        tokenize("@if (true) 1"),
        Err(GenesisError::Process(_))
    ));
}

#[test]
fn grouping_is_transparent_to_codegen() {
    assert_eq!(compile("(1 + 2)").unwrap(), compile("1 + 2").unwrap());
}

#[test]
fn block_scopes_shadow_outer_bindings() {
    let execution = run("let x = 1 { let x = 2 } x").unwrap();
    assert_eq!(execution.value, Some(Constant::Number(1.0)));
    assert_eq!(execution.bindings.len(), 1);
}

#[test]
fn assignment_to_undefined_name_fails() {
    assert!(matches!(
        run("y = 1"),
        Err(GenesisError::Runtime(RuntimeError::UndefinedVariable(..)))
    ));
}

#[test]
fn mismatched_operands_fail_at_runtime() {
    assert!(matches!(
        run("1 + true"),
        Err(GenesisError::Runtime(RuntimeError::TypeMismatch { .. }))
    ));
}

#[test]
fn unterminated_string_reports_starting_line() {
    let err = tokenize("let a = 1\nlet s = \"abc\n\n").unwrap_err();
    assert!(matches!(
        err,
        GenesisError::Lexer(LexerError::UnterminatedString(_))
    ));
    assert_eq!(err.line(), Some(2));
}

#[test]
fn parse_errors_carry_lines() {
    let err = parse("let a = 1\n\n(a + 2").unwrap_err();
    assert!(matches!(
        err,
        GenesisError::Parser(ParserError::UnexpectedEof { .. })
    ));
    assert!(matches!(
        parse("a + 1 = 2"),
        Err(GenesisError::Parser(ParserError::InvalidAssignmentTarget(_)))
    ));
}

#[test]
fn bytecode_dump_lists_pools() {
    let dump =
        run_with_options("let x = \"hi\"", &PipelineOptions::new(OutputMode::Bytecode)).unwrap();
    assert!(dump.contains("CONSTANT"));
    assert!(dump.contains("DEFINE_VARIABLE"));
    assert!(dump.contains("0000 | \"hi\""));
    assert!(dump.contains("0000 | x"));
}

#[test]
fn strings_may_span_lines() {
    let execution = run("let s = \"a\nb\"\ns == \"a\nb\"").unwrap();
    assert_eq!(execution.value, Some(Constant::Boolean(true)));
}
