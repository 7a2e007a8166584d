//! Error types for all pipeline stages.

use crate::span::Span;
use thiserror::Error;

/// Lexer errors.
#[derive(Debug, Error)]
pub enum LexerError {
    #[error("Unexpected character '{0}' at {1}")]
    UnexpectedChar(char, Span),

    #[error("Unterminated string starting at {0}")]
    UnterminatedString(Span),

    #[error("Invalid directive '{0}' at {1}")]
    InvalidDirective(String, Span),
}

impl LexerError {
    pub fn unexpected_char(c: char, span: Span) -> Self {
        Self::UnexpectedChar(c, span)
    }

    pub fn unterminated_string(span: Span) -> Self {
        Self::UnterminatedString(span)
    }

    pub fn invalid_directive(text: impl Into<String>, span: Span) -> Self {
        Self::InvalidDirective(text.into(), span)
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedChar(_, span) => *span,
            Self::UnterminatedString(span) => *span,
            Self::InvalidDirective(_, span) => *span,
        }
    }

    pub fn line(&self) -> usize {
        self.span().line
    }
}

/// Preprocessor errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Malformed {directive}: {message} at {span}")]
    Malformed {
        directive: String,
        message: String,
        span: Span,
    },

    #[error("Undefined name '{0}' in @if condition at {1}")]
    UndefinedName(String, Span),

    #[error("{message} at {span}")]
    Unbalanced { message: String, span: Span },
}

impl ProcessError {
    pub fn malformed(directive: impl Into<String>, message: impl Into<String>, span: Span) -> Self {
        Self::Malformed {
            directive: directive.into(),
            message: message.into(),
            span,
        }
    }

    pub fn undefined_name(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedName(name.into(), span)
    }

    pub fn unbalanced(message: impl Into<String>, span: Span) -> Self {
        Self::Unbalanced {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Malformed { span, .. } => *span,
            Self::UndefinedName(_, span) => *span,
            Self::Unbalanced { span, .. } => *span,
        }
    }

    pub fn line(&self) -> usize {
        self.span().line
    }
}

/// Parser errors.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Unexpected token '{found}', expected {expected} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of file, expected {expected} at {span}")]
    UnexpectedEof { expected: String, span: Span },

    #[error("Invalid assignment target at {0}")]
    InvalidAssignmentTarget(Span),

    #[error("{message} at {span}")]
    General { message: String, span: Span },
}

impl ParserError {
    pub fn unexpected_token(
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        Self::UnexpectedEof {
            expected: expected.into(),
            span,
        }
    }

    pub fn invalid_assignment_target(span: Span) -> Self {
        Self::InvalidAssignmentTarget(span)
    }

    pub fn general(message: impl Into<String>, span: Span) -> Self {
        Self::General {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. } => *span,
            Self::UnexpectedEof { span, .. } => *span,
            Self::InvalidAssignmentTarget(span) => *span,
            Self::General { span, .. } => *span,
        }
    }

    pub fn line(&self) -> usize {
        self.span().line
    }
}

/// Bytecode compilation errors.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{message} at {span}")]
    General { message: String, span: Span },
}

impl CompileError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self::General {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::General { span, .. } => *span,
        }
    }
}

/// Runtime errors raised by the VM.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Cannot apply '{operator}' to {left} and {right} (line {line})")]
    TypeMismatch {
        operator: String,
        left: String,
        right: String,
        line: usize,
    },

    #[error("Operator '{operator}' expects numbers, found {found} (line {line})")]
    NonNumericOperand {
        operator: String,
        found: String,
        line: usize,
    },

    #[error("Undefined variable '{0}' (line {1})")]
    UndefinedVariable(String, usize),

    #[error("{message} (line {line})")]
    General { message: String, line: usize },
}

impl RuntimeError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self::General {
            message: message.into(),
            line,
        }
    }

    pub fn type_mismatch(
        operator: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
        line: usize,
    ) -> Self {
        Self::TypeMismatch {
            operator: operator.into(),
            left: left.into(),
            right: right.into(),
            line,
        }
    }

    pub fn non_numeric(operator: impl Into<String>, found: impl Into<String>, line: usize) -> Self {
        Self::NonNumericOperand {
            operator: operator.into(),
            found: found.into(),
            line,
        }
    }

    pub fn undefined_variable(name: impl Into<String>, line: usize) -> Self {
        Self::UndefinedVariable(name.into(), line)
    }

    pub fn line(&self) -> usize {
        match self {
            Self::TypeMismatch { line, .. } => *line,
            Self::NonNumericOperand { line, .. } => *line,
            Self::UndefinedVariable(_, line) => *line,
            Self::General { line, .. } => *line,
        }
    }
}

/// A unified error type for all stages.
#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),

    #[error("Preprocessor error: {0}")]
    Process(#[from] ProcessError),

    #[error("Parser error: {0}")]
    Parser(#[from] ParserError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenesisError {
    /// Source line the error refers to, when the stage tracks one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Lexer(e) => Some(e.line()),
            Self::Process(e) => Some(e.line()),
            Self::Parser(e) => Some(e.line()),
            Self::Compile(e) => Some(e.span().line),
            Self::Runtime(e) => Some(e.line()),
            Self::Io(_) => None,
        }
    }
}
