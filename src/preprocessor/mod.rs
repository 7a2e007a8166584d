//! Token-level preprocessor: evaluates `@define`, `@if`, `@else` and `@end`.

mod defines;
mod processor;

pub use defines::DefineTable;
pub use processor::Preprocessor;
