//! Stack-based virtual machine for executing Genesis bytecode.

use indexmap::IndexMap;

use crate::bytecode::chunk::{BytecodeProgram, Constant};
use crate::bytecode::instruction::OpCode;
use crate::error::RuntimeError;

/// Result type for VM operations.
pub type VmResult<T> = Result<T, RuntimeError>;

/// One block scope's bindings, in definition order.
pub type Scope = IndexMap<String, Constant>;

/// The virtual machine.
///
/// Outer-scope bindings survive between calls to [`Vm::run`]; the operand
/// stack and any inner scopes left over from a failed run are discarded.
#[derive(Debug)]
pub struct Vm {
    stack: Vec<Constant>,
    scopes: Vec<Scope>,
    ip: usize,
    /// Value of the most recent expression statement.
    last_value: Option<Constant>,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            scopes: vec![Scope::new()],
            ip: 0,
            last_value: None,
        }
    }

    /// Execute `program`, returning the value of its last expression statement.
    pub fn run(&mut self, program: &BytecodeProgram) -> VmResult<Option<Constant>> {
        self.stack.clear();
        self.scopes.truncate(1);
        self.ip = 0;
        self.last_value = None;

        while self.ip < program.code.len() {
            let line = program.get_line(self.ip);
            let byte = program.code[self.ip];
            let opcode = OpCode::from_u8(byte)
                .ok_or_else(|| RuntimeError::new(format!("Unknown opcode {}", byte), line))?;
            self.ip += 1;

            self.execute(program, opcode, line)?;
        }

        if self.scopes.len() != 1 {
            return Err(RuntimeError::new(
                "Program ended inside an unclosed scope",
                program.lines.last().copied().unwrap_or(0),
            ));
        }

        tracing::debug!(
            instructions = program.len(),
            bindings = self.bindings().len(),
            "vm finished"
        );
        Ok(self.last_value.take())
    }

    /// Bindings of the outermost scope.
    pub fn bindings(&self) -> &Scope {
        &self.scopes[0]
    }

    /// The operand stack, oldest value first.
    pub fn stack(&self) -> &[Constant] {
        &self.stack
    }

    fn execute(&mut self, program: &BytecodeProgram, opcode: OpCode, line: usize) -> VmResult<()> {
        match opcode {
            OpCode::Constant => {
                let index = self.read_u16(program, line)?;
                let constant = program
                    .constants
                    .get(index as usize)
                    .cloned()
                    .ok_or_else(|| RuntimeError::new("Invalid constant index", line))?;
                self.push(constant);
            }
            OpCode::Pop => {
                let value = self.pop(line)?;
                self.last_value = Some(value);
            }

            OpCode::GetVariable => {
                let name = self.read_label(program, line)?;
                let value = self
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::undefined_variable(name, line))?;
                self.push(value);
            }
            OpCode::DefineVariable => {
                let name = self.read_label(program, line)?;
                let value = self.pop(line)?;
                let scope = self
                    .scopes
                    .last_mut()
                    .ok_or_else(|| RuntimeError::new("No active scope", line))?;
                scope.insert(name.to_string(), value);
            }
            OpCode::SetVariable => {
                let name = self.read_label(program, line)?;
                let value = self.pop(line)?;
                let slot = self
                    .scopes
                    .iter_mut()
                    .rev()
                    .find_map(|scope| scope.get_mut(name))
                    .ok_or_else(|| RuntimeError::undefined_variable(name, line))?;
                *slot = value;
            }

            OpCode::Add | OpCode::Subtract | OpCode::Multiply | OpCode::Divide => {
                self.arithmetic_op(opcode, line)?
            }
            OpCode::Negate => match self.pop(line)? {
                Constant::Number(n) => self.push(Constant::Number(-n)),
                other => return Err(RuntimeError::non_numeric("-", other.tag().to_string(), line)),
            },

            OpCode::Equal | OpCode::NotEqual => self.equality_op(opcode, line)?,
            OpCode::Less | OpCode::LessEqual | OpCode::Greater | OpCode::GreaterEqual => {
                self.comparison_op(opcode, line)?
            }

            OpCode::Not => {
                let value = self.pop(line)?;
                self.push(Constant::Boolean(!value.is_truthy()));
            }

            OpCode::EnterScope => self.scopes.push(Scope::new()),
            OpCode::LeaveScope => {
                if self.scopes.len() <= 1 {
                    return Err(RuntimeError::new("Cannot leave the outermost scope", line));
                }
                self.scopes.pop();
            }

            OpCode::Nop => {}
        }
        Ok(())
    }

    fn read_u16(&mut self, program: &BytecodeProgram, line: usize) -> VmResult<u16> {
        let value = program
            .read_u16(self.ip)
            .ok_or_else(|| RuntimeError::new("Truncated instruction operand", line))?;
        self.ip += 2;
        Ok(value)
    }

    fn read_label<'p>(&mut self, program: &'p BytecodeProgram, line: usize) -> VmResult<&'p str> {
        let index = self.read_u16(program, line)?;
        program
            .labels
            .get(index as usize)
            .map(String::as_str)
            .ok_or_else(|| RuntimeError::new("Invalid label index", line))
    }

    fn lookup(&self, name: &str) -> Option<&Constant> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn push(&mut self, value: Constant) {
        self.stack.push(value);
    }

    fn pop(&mut self, line: usize) -> VmResult<Constant> {
        self.stack
            .pop()
            .ok_or_else(|| RuntimeError::new("Stack underflow", line))
    }

    /// Pop the right operand then the left, requiring matching tags.
    fn pop_operands(&mut self, opcode: OpCode, line: usize) -> VmResult<(Constant, Constant)> {
        let b = self.pop(line)?;
        let a = self.pop(line)?;
        if a.tag() != b.tag() {
            return Err(RuntimeError::type_mismatch(
                opcode.symbol(),
                a.tag().to_string(),
                b.tag().to_string(),
                line,
            ));
        }
        Ok((a, b))
    }

    fn arithmetic_op(&mut self, opcode: OpCode, line: usize) -> VmResult<()> {
        let (a, b) = self.pop_operands(opcode, line)?;
        let (x, y) = match (a, b) {
            (Constant::Number(x), Constant::Number(y)) => (x, y),
            (other, _) => {
                return Err(RuntimeError::non_numeric(
                    opcode.symbol(),
                    other.tag().to_string(),
                    line,
                ))
            }
        };

        let result = match opcode {
            OpCode::Add => x + y,
            OpCode::Subtract => x - y,
            OpCode::Multiply => x * y,
            // IEEE semantics: division by zero yields an infinity or NaN.
            _ => x / y,
        };
        self.push(Constant::Number(result));
        Ok(())
    }

    fn equality_op(&mut self, opcode: OpCode, line: usize) -> VmResult<()> {
        let (a, b) = self.pop_operands(opcode, line)?;
        let equal = a == b;
        self.push(Constant::Boolean(if opcode == OpCode::Equal {
            equal
        } else {
            !equal
        }));
        Ok(())
    }

    fn comparison_op(&mut self, opcode: OpCode, line: usize) -> VmResult<()> {
        let (a, b) = self.pop_operands(opcode, line)?;
        let ordering = match (a, b) {
            (Constant::Number(x), Constant::Number(y)) => x.partial_cmp(&y),
            (other, _) => {
                return Err(RuntimeError::non_numeric(
                    opcode.symbol(),
                    other.tag().to_string(),
                    line,
                ))
            }
        };

        // NaN compares false against everything.
        let result = ordering.is_some_and(|ordering| match opcode {
            OpCode::Less => ordering.is_lt(),
            OpCode::LessEqual => ordering.is_le(),
            OpCode::Greater => ordering.is_gt(),
            _ => ordering.is_ge(),
        });
        self.push(Constant::Boolean(result));
        Ok(())
    }
}
