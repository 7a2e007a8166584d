//! Abstract Syntax Tree for Genesis.

pub mod expr;
pub mod printer;
pub mod stmt;
pub mod visitor;

pub use expr::{Expr, ExprKind, Literal};
pub use printer::{print_program, AstPrinter};
pub use stmt::{Program, Stmt, StmtKind};
pub use visitor::Visitor;
