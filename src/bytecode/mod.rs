//! Bytecode module for the Genesis VM.
//!
//! # Architecture
//!
//! - `instruction`: OpCode definitions for the bytecode instruction set
//! - `chunk`: the compiled program with its constant and label pools
//! - `compiler`: transforms AST into bytecode
//! - `vm`: stack-based virtual machine for executing bytecode
//! - `disassembler`: debug output for bytecode inspection

pub mod chunk;
pub mod compiler;
pub mod disassembler;
pub mod instruction;
pub mod vm;

pub use chunk::{BytecodeProgram, Constant, ConstantTag};
pub use compiler::{CompileResult, Compiler};
pub use disassembler::disassemble;
pub use instruction::OpCode;
pub use vm::{Scope, Vm, VmResult};
