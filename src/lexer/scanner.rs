//! Lexer/Scanner for Genesis source code.

use crate::error::LexerError;
use crate::lexer::token::{DirectiveKind, DirectiveOccurrence, Token, TokenKind};
use crate::span::Span;

/// Everything the scanner produces: the token stream and where its directives are.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutput {
    pub tokens: Vec<Token>,
    pub directives: Vec<DirectiveOccurrence>,
}

/// The lexer transforms source code into a stream of tokens.
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    line: usize,
    column: usize,
    start_pos: usize,
    start_line: usize,
    start_column: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Scan the whole source, recording every directive occurrence on the way.
    pub fn scan(mut self) -> Result<ScanOutput, LexerError> {
        let mut tokens = Vec::new();
        let mut directives = Vec::new();

        loop {
            let token = self.scan_token()?;
            if let TokenKind::Directive(kind) = token.kind {
                directives.push(DirectiveOccurrence {
                    kind,
                    raw_text: token.text.clone(),
                    token_offset: tokens.len(),
                });
            }
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tracing::debug!(
            tokens = tokens.len(),
            directives = directives.len(),
            "scanned source"
        );
        Ok(ScanOutput { tokens, directives })
    }

    /// Scan all tokens from the source, discarding directive positions.
    pub fn scan_tokens(self) -> Result<Vec<Token>, LexerError> {
        self.scan().map(|output| output.tokens)
    }

    /// Scan the next token.
    pub fn scan_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace_and_comments();
        self.mark_start();

        let Some((_, c)) = self.advance() else {
            return Ok(Token::eof(self.current_pos, self.line, self.column));
        };

        match c {
            // Single-character tokens
            '(' => Ok(self.make_token(TokenKind::LeftParen)),
            ')' => Ok(self.make_token(TokenKind::RightParen)),
            '{' => Ok(self.make_token(TokenKind::LeftBrace)),
            '}' => Ok(self.make_token(TokenKind::RightBrace)),
            '[' => Ok(self.make_token(TokenKind::LeftBracket)),
            ']' => Ok(self.make_token(TokenKind::RightBracket)),
            ',' => Ok(self.make_token(TokenKind::Comma)),
            '.' => Ok(self.make_token(TokenKind::Dot)),
            ':' => Ok(self.make_token(TokenKind::Colon)),
            ';' => Ok(self.make_token(TokenKind::Semicolon)),
            '+' => Ok(self.make_token(TokenKind::Plus)),
            '-' => Ok(self.make_token(TokenKind::Minus)),
            '*' => Ok(self.make_token(TokenKind::Star)),
            '/' => Ok(self.make_token(TokenKind::Slash)),

            // Two-character tokens
            '=' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::EqualEqual))
                } else {
                    Ok(self.make_token(TokenKind::Equal))
                }
            }
            '!' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::BangEqual))
                } else {
                    Ok(self.make_token(TokenKind::Bang))
                }
            }
            '<' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::LessEqual))
                } else {
                    Ok(self.make_token(TokenKind::Less))
                }
            }
            '>' => {
                if self.match_char('=') {
                    Ok(self.make_token(TokenKind::GreaterEqual))
                } else {
                    Ok(self.make_token(TokenKind::Greater))
                }
            }

            '@' => self.scan_directive(),

            '"' => self.scan_string(),

            c if c.is_ascii_digit() => self.scan_number(),

            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(),

            _ => Err(LexerError::unexpected_char(c, self.current_span())),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\0' | '\u{8}') => {
                    self.advance();
                }
                Some('\n') => {
                    self.advance();
                    self.new_line();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while self.peek().is_some() && self.peek() != Some('\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Strings have no escapes and may span lines.
    fn scan_string(&mut self) -> Result<Token, LexerError> {
        let mut value = String::new();

        loop {
            match self.peek() {
                None => {
                    return Err(LexerError::unterminated_string(self.current_span()));
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\n') => {
                    self.advance();
                    self.new_line();
                    value.push('\n');
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }

        Ok(Token::new(TokenKind::String, value, self.current_span()))
    }

    /// Digits with at most one `.` or `e` separator. The separator is only
    /// taken when a digit follows it, so the lexeme always parses as `f64`.
    fn scan_number(&mut self) -> Result<Token, LexerError> {
        self.consume_digits();

        if matches!(self.peek(), Some('.' | 'e'))
            && self.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.advance();
            self.consume_digits();
        }

        Ok(self.make_token(TokenKind::Number))
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_identifier(&mut self) -> Result<Token, LexerError> {
        self.consume_word();
        let kind = TokenKind::keyword(self.lexeme()).unwrap_or(TokenKind::Identifier);
        Ok(self.make_token(kind))
    }

    fn scan_directive(&mut self) -> Result<Token, LexerError> {
        self.consume_word();
        let text = self.lexeme();
        match DirectiveKind::lookup(text) {
            Some(kind) => Ok(self.make_token(TokenKind::Directive(kind))),
            None => Err(LexerError::invalid_directive(text, self.current_span())),
        }
    }

    fn consume_word(&mut self) {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos + c.len_utf8();
            self.column += 1;
            Some((pos, c))
        } else {
            None
        }
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].chars();
        iter.next();
        iter.next()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn mark_start(&mut self) {
        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn lexeme(&self) -> &'a str {
        &self.source[self.start_pos..self.current_pos]
    }

    fn current_span(&self) -> Span {
        Span::new(
            self.start_pos,
            self.current_pos,
            self.start_line,
            self.start_column,
        )
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.lexeme(), self.current_span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<TokenKind> {
        Scanner::new(source)
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn texts(source: &str) -> Vec<String> {
        Scanner::new(source)
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            scan("(){}[];"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_two_character_operators_are_not_split() {
        assert_eq!(
            scan("a<=b"),
            vec![
                TokenKind::Identifier,
                TokenKind::LessEqual,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            scan("== != >= = ! < >"),
            vec![
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::GreaterEqual,
                TokenKind::Equal,
                TokenKind::Bang,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(texts("42 3.14 1e5"), vec!["42", "3.14", "1e5", ""]);
        assert_eq!(
            scan("42 3.14"),
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn test_second_separator_starts_a_new_token() {
        assert_eq!(
            scan("1.2.3"),
            vec![
                TokenKind::Number,
                TokenKind::Dot,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
        assert_eq!(texts("1.2.3"), vec!["1.2", ".", "3", ""]);
    }

    #[test]
    fn test_separator_without_digit_is_not_consumed() {
        assert_eq!(
            scan("1.x"),
            vec![
                TokenKind::Number,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string() {
        let tokens = Scanner::new(r#""hello""#).scan_tokens().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "hello");
    }

    #[test]
    fn test_empty_string() {
        let tokens = Scanner::new(r#""""#).scan_tokens().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "");
    }

    #[test]
    fn test_unterminated_string_reports_starting_line() {
        let err = Scanner::new("1\n\"abc\nmore").scan_tokens().unwrap_err();
        match err {
            LexerError::UnterminatedString(span) => assert_eq!(span.line, 2),
            other => panic!("Expected unterminated string, got {:?}", other),
        }
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            scan("let function if else while true false null"),
            vec![
                TokenKind::Let,
                TokenKind::Function,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(scan("Let"), vec![TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            scan("1 // comment\n2"),
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = Scanner::new("let x\n  = 1").scan_tokens().unwrap();
        assert_eq!((tokens[0].line(), tokens[0].column()), (1, 1));
        assert_eq!((tokens[1].line(), tokens[1].column()), (1, 5));
        assert_eq!((tokens[2].line(), tokens[2].column()), (2, 3));
    }

    #[test]
    fn test_skips_control_whitespace() {
        assert_eq!(
            scan("1\0\u{8}\t\r2"),
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let err = Scanner::new("1 # 2").scan_tokens().unwrap_err();
        assert!(matches!(err, LexerError::UnexpectedChar('#', _)));
    }

    #[test]
    fn test_directives_are_recorded() {
        let output = Scanner::new("@define X = true\n@if (X) 1 @end")
            .scan()
            .unwrap();
        let kinds: Vec<_> = output.directives.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DirectiveKind::Define, DirectiveKind::If, DirectiveKind::End]
        );
        for directive in &output.directives {
            assert_eq!(
                output.tokens[directive.token_offset].kind,
                TokenKind::Directive(directive.kind)
            );
            assert_eq!(output.tokens[directive.token_offset].text, directive.raw_text);
        }
    }

    #[test]
    fn test_invalid_directive() {
        let err = Scanner::new("@include").scan_tokens().unwrap_err();
        assert!(matches!(err, LexerError::InvalidDirective(ref name, _) if name == "@include"));
    }
}
