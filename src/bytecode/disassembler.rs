//! Bytecode disassembler for debugging.

use crate::bytecode::chunk::BytecodeProgram;
use crate::bytecode::instruction::OpCode;

/// Disassemble a program: instructions, then the constant pool, then labels.
pub fn disassemble(program: &BytecodeProgram) -> String {
    let mut output = String::from("== instructions ==\n");

    let mut offset = 0;
    let mut index = 0;
    while offset < program.code.len() {
        offset = disassemble_instruction(program, index, offset, &mut output);
        index += 1;
    }

    output.push_str("== constants ==\n");
    for (index, constant) in program.constants.iter().enumerate() {
        output.push_str(&format!("{:04} | {}\n", index, constant));
    }

    output.push_str("== labels ==\n");
    for (index, label) in program.labels.iter().enumerate() {
        output.push_str(&format!("{:04} | {}\n", index, label));
    }

    output
}

/// Disassemble the `index`-th instruction, which starts at byte `offset`.
/// Returns the offset of the next one.
pub fn disassemble_instruction(
    program: &BytecodeProgram,
    index: usize,
    offset: usize,
    output: &mut String,
) -> usize {
    let byte = program.code[offset];
    let opcode = match OpCode::from_u8(byte) {
        Some(op) => op,
        None => {
            output.push_str(&format!(
                "{:04} [{:04}] | Unknown opcode {}\n",
                index, offset, byte
            ));
            return offset + 1;
        }
    };

    output.push_str(&format!(
        "{:04} [{:04}] | {:<16} | {:>3}",
        index,
        offset,
        opcode.mnemonic(),
        byte
    ));

    if opcode.operand_bytes() == 0 {
        output.push('\n');
        return offset + 1;
    }

    let Some(operand) = program.read_u16(offset + 1) else {
        output.push_str(" | <truncated>\n");
        return program.code.len();
    };

    let target = match opcode {
        OpCode::Constant => program.constants.get(operand as usize).map(|c| c.to_string()),
        _ => program.labels.get(operand as usize).cloned(),
    };
    output.push_str(&format!(
        " | {:>5} ({})\n",
        operand,
        target.as_deref().unwrap_or("?")
    ));

    offset + 1 + opcode.operand_bytes()
}
