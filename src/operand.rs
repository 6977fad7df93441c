//! Operand Resolver: converts textual operands into integer values

use crate::data_memory::DataMemory;
use crate::error::{SimulatorError, SimulatorResult};
use crate::program::Program;
use crate::register_file::RegisterFile;

/// Resolves a textual operand to its integer value, trying in order:
/// register name, address expression `imm(reg)`/`reg(imm)`, label, then
/// immediate literal.
pub fn resolve_value(
    operand: &str,
    registers: &RegisterFile,
    data: &DataMemory,
    program: &Program,
    line_number: usize,
) -> SimulatorResult<i32> {
    if let Some(index) = RegisterFile::index_of(operand) {
        return Ok(registers.read(index) as i32);
    }

    if is_address_expression(operand) {
        let index = address_to_index(operand, registers, line_number)?;
        return Ok(data.get(index) as i32);
    }

    if let Some(&target) = program.labels.get(operand) {
        return Ok(target as i32);
    }

    resolve_immediate(operand, line_number)
}

/// True when `operand` is an `imm(reg)` / `reg(imm)` address expression.
pub fn is_address_expression(operand: &str) -> bool {
    operand.contains('(') && operand.contains(')')
}

/// Converts an `imm(reg)` / `reg(imm)` address expression into a
/// data-memory word index: `(imm + reg_value - 256) / 4`.
///
/// Which side holds the register is determined the same way the original
/// implementation does: a leading `R` means the first side is the
/// register and the second the immediate, otherwise the reverse.
pub fn address_to_index(
    operand: &str,
    registers: &RegisterFile,
    line_number: usize,
) -> SimulatorResult<usize> {
    let open = operand
        .find('(')
        .ok_or_else(|| SimulatorError::UnresolvedOperand(operand.to_string(), line_number))?;
    let close = operand
        .find(')')
        .ok_or_else(|| SimulatorError::UnresolvedOperand(operand.to_string(), line_number))?;

    let op1 = &operand[..open];
    let op2 = &operand[open + 1..close];

    let (val1, val2) = if !operand.starts_with('R') {
        // op1 is an immediate, op2 is a register
        let val1: i32 = op1
            .parse()
            .map_err(|_| SimulatorError::UnresolvedOperand(operand.to_string(), line_number))?;
        let reg = RegisterFile::index_of(op2)
            .ok_or_else(|| SimulatorError::UnresolvedOperand(operand.to_string(), line_number))?;
        (val1, registers.read(reg) as i32)
    } else {
        // op1 is a register, op2 is an immediate
        let reg = RegisterFile::index_of(op1)
            .ok_or_else(|| SimulatorError::UnresolvedOperand(operand.to_string(), line_number))?;
        let val2: i32 = op2
            .parse()
            .map_err(|_| SimulatorError::UnresolvedOperand(operand.to_string(), line_number))?;
        (registers.read(reg) as i32, val2)
    };

    let address = val1.wrapping_add(val2);
    Ok(DataMemory::address_to_index(address))
}

/// Parses an immediate literal: a trailing `H` denotes hexadecimal,
/// otherwise the token is decimal.
pub fn resolve_immediate(operand: &str, line_number: usize) -> SimulatorResult<i32> {
    if let Some(digits) = operand.strip_suffix('H') {
        i32::from_str_radix(digits, 16)
            .map_err(|_| SimulatorError::UnresolvedOperand(operand.to_string(), line_number))
    } else {
        operand
            .parse()
            .map_err(|_| SimulatorError::UnresolvedOperand(operand.to_string(), line_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::decode_helper::parse_line;

    fn program_with(lines: &[&str]) -> Program {
        let instrs: Vec<_> =
            lines.iter().enumerate().map(|(i, l)| parse_line(i + 1, l)).collect();
        Program::new(instrs)
    }

    #[test]
    fn resolves_register_operand() {
        let mut regs = RegisterFile::default();
        regs.write(1, 99);
        let program = program_with(&["HLT"]);
        let data = DataMemory::default();
        let v = resolve_value("R1", &regs, &data, &program, 1).unwrap();
        assert_eq!(v, 99);
    }

    #[test]
    fn resolves_decimal_and_hex_immediates() {
        assert_eq!(resolve_immediate("42", 1).unwrap(), 42);
        assert_eq!(resolve_immediate("2AH", 1).unwrap(), 42);
    }

    #[test]
    fn resolves_label_to_line_number() {
        let regs = RegisterFile::default();
        let data = DataMemory::default();
        let program = program_with(&["J END", "END: HLT"]);
        let v = resolve_value("END", &regs, &data, &program, 1).unwrap();
        assert_eq!(v, 2);
    }

    #[test]
    fn address_expression_reads_data_memory() {
        let regs = RegisterFile::default();
        let mut data = DataMemory::default();
        data.set(1, 10);
        let program = program_with(&["HLT"]);
        let v = resolve_value("260(R0)", &regs, &data, &program, 1).unwrap();
        assert_eq!(v, 10);
    }

    #[test]
    fn address_expression_register_first_form() {
        let mut regs = RegisterFile::default();
        regs.write(0, 256);
        let index = address_to_index("R0(4)", &regs, 1).unwrap();
        assert_eq!(index, 1);
    }
}
