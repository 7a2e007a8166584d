//! Bytecode program: instructions plus constant and label pools.

use std::fmt;

use crate::bytecode::instruction::OpCode;
use crate::error::CompileError;
use crate::span::Span;

/// Which variant a [`Constant`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantTag {
    Boolean,
    Number,
    Null,
    String,
}

impl fmt::Display for ConstantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantTag::Boolean => write!(f, "boolean"),
            ConstantTag::Number => write!(f, "number"),
            ConstantTag::Null => write!(f, "null"),
            ConstantTag::String => write!(f, "string"),
        }
    }
}

/// A runtime value. Also the element type of the constant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Boolean(bool),
    Number(f64),
    Null,
    String(String),
}

impl Constant {
    pub fn tag(&self) -> ConstantTag {
        match self {
            Constant::Boolean(_) => ConstantTag::Boolean,
            Constant::Number(_) => ConstantTag::Number,
            Constant::Null => ConstantTag::Null,
            Constant::String(_) => ConstantTag::String,
        }
    }

    /// `false` and `null` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Constant::Boolean(false) | Constant::Null)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Boolean(b) => write!(f, "{}", b),
            Constant::Number(n) => write!(f, "{}", n),
            Constant::Null => write!(f, "null"),
            Constant::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Compiled program. Operands are big-endian u16 pool indices following
/// their opcode byte.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BytecodeProgram {
    /// The bytecode instructions.
    pub code: Vec<u8>,
    /// Source line numbers, parallel to `code`.
    pub lines: Vec<usize>,
    /// Constant pool. Not deduplicated.
    pub constants: Vec<Constant>,
    /// Variable names. Deduplicated.
    pub labels: Vec<String>,
}

impl BytecodeProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write an opcode to the program.
    pub fn write_op(&mut self, op: OpCode, line: usize) {
        self.write_byte(op.into(), line);
    }

    pub fn write_byte(&mut self, byte: u8, line: usize) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Write a 16-bit value (big-endian).
    pub fn write_u16(&mut self, value: u16, line: usize) {
        let [high, low] = value.to_be_bytes();
        self.write_byte(high, line);
        self.write_byte(low, line);
    }

    /// Read a 16-bit value at `offset`, if both bytes exist.
    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        let high = *self.code.get(offset)?;
        let low = *self.code.get(offset + 1)?;
        Some(u16::from_be_bytes([high, low]))
    }

    /// Add a constant to the pool and return its index.
    pub fn add_constant(&mut self, constant: Constant, span: Span) -> Result<u16, CompileError> {
        let index = u16::try_from(self.constants.len())
            .map_err(|_| CompileError::new("Too many constants in one program", span))?;
        self.constants.push(constant);
        Ok(index)
    }

    /// Index of `name` in the label pool, adding it on first use.
    pub fn add_label(&mut self, name: &str, span: Span) -> Result<u16, CompileError> {
        if let Some(existing) = self.labels.iter().position(|label| label == name) {
            // Existing positions were range-checked when they were added.
            return Ok(existing as u16);
        }
        let index = u16::try_from(self.labels.len())
            .map_err(|_| CompileError::new("Too many variable names in one program", span))?;
        self.labels.push(name.to_string());
        Ok(index)
    }

    pub fn get_line(&self, offset: usize) -> usize {
        self.lines.get(offset).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}
