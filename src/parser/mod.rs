//! Parser module for Genesis.

mod core;
mod expressions;
mod precedence;
mod statements;


pub use self::core::{ParseResult, Parser, MAX_NESTING_DEPTH};
pub use self::precedence::{get_precedence, Precedence};
