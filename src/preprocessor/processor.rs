//! Directive evaluation over a scanned token stream.

use std::ops::Range;

use crate::error::ProcessError;
use crate::lexer::{DirectiveKind, DirectiveOccurrence, Token, TokenKind};
use crate::span::Span;

use super::defines::DefineTable;

pub type ProcessResult<T> = Result<T, ProcessError>;

/// The matching `@else` / `@end` for one `@if`, as indices into the directive list.
struct Conditional {
    else_index: Option<usize>,
    end_index: usize,
}

/// Walks the recorded directive occurrences, copying the ordinary tokens
/// between them and evaluating each directive in place.
pub struct Preprocessor {
    tokens: Vec<Token>,
    directives: Vec<DirectiveOccurrence>,
    defines: DefineTable,
    output: Vec<Token>,
}

impl Preprocessor {
    pub fn new(tokens: Vec<Token>, directives: Vec<DirectiveOccurrence>) -> Self {
        Self {
            tokens,
            directives,
            defines: DefineTable::new(),
            output: Vec::new(),
        }
    }

    /// Start the pass with names already bound.
    pub fn with_defines(mut self, defines: DefineTable) -> Self {
        self.defines = defines;
        self
    }

    /// Names bound so far, including those seeded with [`Preprocessor::with_defines`].
    pub fn defines(&self) -> &DefineTable {
        &self.defines
    }

    /// Run the pass. The result keeps every surviving token in source order and
    /// contains no directive tokens.
    pub fn process(&mut self) -> ProcessResult<Vec<Token>> {
        self.output = Vec::with_capacity(self.tokens.len());
        self.process_region(0..self.tokens.len(), 0..self.directives.len())?;
        tracing::debug!(
            input = self.tokens.len(),
            output = self.output.len(),
            defines = self.defines.len(),
            "preprocessed tokens"
        );
        Ok(std::mem::take(&mut self.output))
    }

    /// Process the tokens in `tokens`, whose directives are exactly `directives`.
    fn process_region(
        &mut self,
        tokens: Range<usize>,
        directives: Range<usize>,
    ) -> ProcessResult<()> {
        let mut cursor = tokens.start;
        let mut index = directives.start;

        while index < directives.end {
            let offset = self.directives[index].token_offset;
            self.emit(cursor..offset);

            match self.directives[index].kind {
                DirectiveKind::Define => {
                    cursor = self.define(offset)?;
                    index += 1;
                }
                DirectiveKind::If => {
                    let (next_cursor, next_index) = self.conditional(index, directives.end)?;
                    cursor = next_cursor;
                    index = next_index;
                }
                kind @ (DirectiveKind::Else | DirectiveKind::End) => {
                    return Err(ProcessError::unbalanced(
                        format!("{} without a matching @if", kind),
                        self.tokens[offset].span,
                    ));
                }
            }
        }

        self.emit(cursor..tokens.end);
        Ok(())
    }

    /// `@define NAME = LITERAL`. Returns the offset of the first token after it.
    fn define(&mut self, offset: usize) -> ProcessResult<usize> {
        let directive_span = self.tokens[offset].span;
        let name = self
            .expect_at(offset + 1, "@define", "a name", directive_span, |kind| {
                kind == TokenKind::Identifier
            })?
            .text
            .clone();
        self.expect_at(offset + 2, "@define", "'='", directive_span, |kind| {
            kind == TokenKind::Equal
        })?;
        let value = self
            .expect_at(offset + 3, "@define", "a literal value", directive_span, |kind| {
                kind.is_literal()
            })?
            .clone();

        tracing::debug!(name = %name, value = %value.text, "define");
        self.defines.define(name, value);
        Ok(offset + 4)
    }

    /// `@if ( COND ) ... [@else ...] @end`. Returns the token offset and the
    /// directive index just past the matching `@end`.
    fn conditional(&mut self, index: usize, limit: usize) -> ProcessResult<(usize, usize)> {
        let offset = self.directives[index].token_offset;
        let directive_span = self.tokens[offset].span;

        self.expect_at(offset + 1, "@if", "'('", directive_span, |kind| {
            kind == TokenKind::LeftParen
        })?;
        let condition = self
            .expect_at(offset + 2, "@if", "a literal or name", directive_span, |kind| {
                kind.is_literal() || kind == TokenKind::Identifier
            })?
            .clone();
        self.expect_at(offset + 3, "@if", "')'", directive_span, |kind| {
            kind == TokenKind::RightParen
        })?;

        let truthy = self.evaluate(&condition)?;
        let Conditional {
            else_index,
            end_index,
        } = self.match_conditional(index, limit, directive_span)?;

        let body_start = offset + 4;
        let end_offset = self.directives[end_index].token_offset;
        tracing::debug!(
            condition = %condition.text,
            truthy,
            has_else = else_index.is_some(),
            "conditional"
        );

        match (truthy, else_index) {
            (true, Some(else_index)) => {
                let else_offset = self.directives[else_index].token_offset;
                self.process_region(body_start..else_offset, index + 1..else_index)?;
            }
            (true, None) => {
                self.process_region(body_start..end_offset, index + 1..end_index)?;
            }
            (false, Some(else_index)) => {
                let else_offset = self.directives[else_index].token_offset;
                self.process_region(else_offset + 1..end_offset, else_index + 1..end_index)?;
            }
            (false, None) => {}
        }

        Ok((end_offset + 1, end_index + 1))
    }

    /// Find the `@else` and `@end` belonging to the `@if` at `index`, skipping nested ones.
    fn match_conditional(
        &self,
        index: usize,
        limit: usize,
        if_span: Span,
    ) -> ProcessResult<Conditional> {
        let mut depth = 0usize;
        let mut else_index = None;

        for candidate in index + 1..limit {
            let occurrence = &self.directives[candidate];
            match occurrence.kind {
                DirectiveKind::If => depth += 1,
                DirectiveKind::End if depth == 0 => {
                    return Ok(Conditional {
                        else_index,
                        end_index: candidate,
                    });
                }
                DirectiveKind::End => depth -= 1,
                DirectiveKind::Else if depth == 0 => {
                    if else_index.is_some() {
                        return Err(ProcessError::unbalanced(
                            "second @else for the same @if",
                            self.tokens[occurrence.token_offset].span,
                        ));
                    }
                    else_index = Some(candidate);
                }
                DirectiveKind::Else | DirectiveKind::Define => {}
            }
        }

        Err(ProcessError::unbalanced("@if without a matching @end", if_span))
    }

    /// A condition is truthy unless it is `false` or `null`.
    fn evaluate(&self, condition: &Token) -> ProcessResult<bool> {
        let value = if condition.kind == TokenKind::Identifier {
            self.defines
                .get(&condition.text)
                .ok_or_else(|| ProcessError::undefined_name(&condition.text, condition.span))?
        } else {
            condition
        };
        Ok(!matches!(value.kind, TokenKind::False | TokenKind::Null))
    }

    fn expect_at(
        &self,
        offset: usize,
        directive: &str,
        expected: &str,
        directive_span: Span,
        accepts: impl Fn(TokenKind) -> bool,
    ) -> ProcessResult<&Token> {
        match self.tokens.get(offset) {
            Some(token) if accepts(token.kind) => Ok(token),
            Some(token) if token.kind == TokenKind::Eof => Err(ProcessError::malformed(
                directive,
                format!("expected {}, found end of file", expected),
                token.span,
            )),
            Some(token) => Err(ProcessError::malformed(
                directive,
                format!("expected {}, found '{}'", expected, token.kind),
                token.span,
            )),
            None => Err(ProcessError::malformed(
                directive,
                format!("expected {}, found end of file", expected),
                directive_span,
            )),
        }
    }

    fn emit(&mut self, range: Range<usize>) {
        if range.start < range.end {
            self.output.extend_from_slice(&self.tokens[range]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> ProcessResult<Vec<Token>> {
        let scanned = Scanner::new(source).scan().unwrap();
        Preprocessor::new(scanned.tokens, scanned.directives).process()
    }

    fn texts(source: &str) -> Vec<String> {
        run(source)
            .unwrap()
            .into_iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_passthrough_without_directives() {
        assert_eq!(texts("let x = 1 + 2"), vec!["let", "x", "=", "1", "+", "2"]);
    }

    #[test]
    fn test_output_ends_with_eof() {
        let tokens = run("@define X = true 1").unwrap();
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn test_define_is_not_emitted() {
        assert_eq!(texts("@define X = 1 a"), vec!["a"]);
    }

    #[test]
    fn test_dead_branch_is_dropped() {
        assert_eq!(
            texts("@define X = false @if (X) a b @else c d @end"),
            vec!["c", "d"]
        );
    }

    #[test]
    fn test_true_branch_skips_else() {
        assert_eq!(
            texts("@define X = true before @if (X) a @else b @end after"),
            vec!["before", "a", "after"]
        );
    }

    #[test]
    fn test_null_literal_condition_is_falsy() {
        assert_eq!(texts("@if (null) a @end b"), vec!["b"]);
    }

    #[test]
    fn test_number_and_string_conditions_are_truthy() {
        assert_eq!(texts("@if (0) a @end @if (\"\") b @end"), vec!["a", "b"]);
    }

    #[test]
    fn test_nested_conditional_in_taken_branch() {
        let source = "@define A = true @define B = false \
                      @if (A) x @if (B) y @else z @end w @else v @end";
        assert_eq!(texts(source), vec!["x", "z", "w"]);
    }

    #[test]
    fn test_nested_conditional_in_taken_else_branch() {
        assert_eq!(
            texts("@if (false) x @else y @if (true) z @end @end"),
            vec!["y", "z"]
        );
        assert_eq!(
            texts("@if (null) x @else @if (false) a @else b @end c @end"),
            vec!["b", "c"]
        );
    }

    #[test]
    fn test_nested_conditional_in_dead_branch_is_skipped() {
        let source = "@if (false) @if (UNDEFINED) a @end @else b @end";
        assert_eq!(texts(source), vec!["b"]);
    }

    #[test]
    fn test_define_inside_dead_branch_is_ignored() {
        let scanned = Scanner::new("@if (false) @define X = 1 @end")
            .scan()
            .unwrap();
        let mut preprocessor = Preprocessor::new(scanned.tokens, scanned.directives);
        preprocessor.process().unwrap();
        assert!(!preprocessor.defines().contains("X"));
    }

    #[test]
    fn test_undefined_name_fails() {
        let err = run("@if (MISSING) a @end").unwrap_err();
        assert!(matches!(err, ProcessError::UndefinedName(ref name, _) if name == "MISSING"));
    }

    #[test]
    fn test_missing_end_fails() {
        let err = run("@if (true) a").unwrap_err();
        assert!(matches!(err, ProcessError::Unbalanced { .. }));
    }

    #[test]
    fn test_stray_end_fails() {
        let err = run("a @end").unwrap_err();
        assert!(matches!(err, ProcessError::Unbalanced { .. }));
    }

    #[test]
    fn test_second_else_fails() {
        let err = run("@if (true) a @else b @else c @end").unwrap_err();
        assert!(matches!(err, ProcessError::Unbalanced { .. }));
    }

    #[test]
    fn test_malformed_define_fails() {
        assert!(matches!(
            run("@define X true").unwrap_err(),
            ProcessError::Malformed { .. }
        ));
        assert!(matches!(
            run("@define = 1").unwrap_err(),
            ProcessError::Malformed { .. }
        ));
        assert!(matches!(
            run("@define X =").unwrap_err(),
            ProcessError::Malformed { .. }
        ));
    }

    #[test]
    fn test_malformed_if_fails() {
        assert!(matches!(
            run("@if true a @end").unwrap_err(),
            ProcessError::Malformed { .. }
        ));
        assert!(matches!(
            run("@if (a + b) a @end").unwrap_err(),
            ProcessError::Malformed { .. }
        ));
    }

    #[test]
    fn test_seeded_defines() {
        let scanned = Scanner::new("@if (FLAG) a @else b @end").scan().unwrap();
        let mut defines = DefineTable::new();
        defines.define(
            "FLAG",
            Token::new(TokenKind::False, "false", Span::default()),
        );
        let tokens = Preprocessor::new(scanned.tokens, scanned.directives)
            .with_defines(defines)
            .process()
            .unwrap();
        let texts: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["b"]);
    }
}
