//! Lexer module for Genesis.

pub mod scanner;
pub mod token;

pub use scanner::{ScanOutput, Scanner};
pub use token::{DirectiveKind, DirectiveOccurrence, Token, TokenKind};
