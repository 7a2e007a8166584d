//! Bytecode instruction definitions for the Genesis VM.

/// Opcodes for the bytecode virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    // ============ Constants & Stack ============
    /// Load a constant from the constant pool: CONSTANT <index:u16>
    Constant = 0,
    /// Pop the top value from the stack
    Pop,

    // ============ Variables ============
    /// Read a variable: GET_VARIABLE <label:u16>
    GetVariable,
    /// Bind a new variable in the innermost scope: DEFINE_VARIABLE <label:u16>
    DefineVariable,
    /// Update the nearest existing binding: SET_VARIABLE <label:u16>
    SetVariable,

    // ============ Arithmetic ============
    /// Add two values: a + b
    Add,
    /// Subtract two values: a - b
    Subtract,
    /// Multiply two values: a * b
    Multiply,
    /// Divide two values: a / b
    Divide,
    /// Negate a value: -a
    Negate,

    // ============ Comparison ============
    /// Equal: a == b
    Equal,
    /// Not equal: a != b
    NotEqual,
    /// Less than: a < b
    Less,
    /// Less or equal: a <= b
    LessEqual,
    /// Greater than: a > b
    Greater,
    /// Greater or equal: a >= b
    GreaterEqual,

    // ============ Logic ============
    /// Logical not: !a
    Not,

    // ============ Scopes ============
    /// Open a block scope
    EnterScope,
    /// Close the innermost block scope
    LeaveScope,

    /// Does nothing
    Nop,
}

const OPCODES: [OpCode; 20] = [
    OpCode::Constant,
    OpCode::Pop,
    OpCode::GetVariable,
    OpCode::DefineVariable,
    OpCode::SetVariable,
    OpCode::Add,
    OpCode::Subtract,
    OpCode::Multiply,
    OpCode::Divide,
    OpCode::Negate,
    OpCode::Equal,
    OpCode::NotEqual,
    OpCode::Less,
    OpCode::LessEqual,
    OpCode::Greater,
    OpCode::GreaterEqual,
    OpCode::Not,
    OpCode::EnterScope,
    OpCode::LeaveScope,
    OpCode::Nop,
];

impl OpCode {
    /// Number of operand bytes following the opcode.
    pub fn operand_bytes(self) -> usize {
        match self {
            OpCode::Constant
            | OpCode::GetVariable
            | OpCode::DefineVariable
            | OpCode::SetVariable => 2,
            _ => 0,
        }
    }

    /// Convert from u8 to OpCode.
    pub fn from_u8(byte: u8) -> Option<OpCode> {
        OPCODES.get(byte as usize).copied()
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Constant => "CONSTANT",
            OpCode::Pop => "POP",
            OpCode::GetVariable => "GET_VARIABLE",
            OpCode::DefineVariable => "DEFINE_VARIABLE",
            OpCode::SetVariable => "SET_VARIABLE",
            OpCode::Add => "ADD",
            OpCode::Subtract => "SUBTRACT",
            OpCode::Multiply => "MULTIPLY",
            OpCode::Divide => "DIVIDE",
            OpCode::Negate => "NEGATE",
            OpCode::Equal => "EQUAL",
            OpCode::NotEqual => "NOT_EQUAL",
            OpCode::Less => "LESS",
            OpCode::LessEqual => "LESS_EQUAL",
            OpCode::Greater => "GREATER",
            OpCode::GreaterEqual => "GREATER_EQUAL",
            OpCode::Not => "NOT",
            OpCode::EnterScope => "ENTER_SCOPE",
            OpCode::LeaveScope => "LEAVE_SCOPE",
            OpCode::Nop => "NOP",
        }
    }

    /// Source spelling of the operator, used in runtime error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            OpCode::Add => "+",
            OpCode::Subtract | OpCode::Negate => "-",
            OpCode::Multiply => "*",
            OpCode::Divide => "/",
            OpCode::Equal => "==",
            OpCode::NotEqual => "!=",
            OpCode::Less => "<",
            OpCode::LessEqual => "<=",
            OpCode::Greater => ">",
            OpCode::GreaterEqual => ">=",
            OpCode::Not => "!",
            other => other.mnemonic(),
        }
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> u8 {
        op as u8
    }
}
