//! Tokenizing and operand-classification helpers used by [`crate::parser`].
//!
//! Mirrors the original C++ `read_instruction_line` pipeline: strip bars,
//! trim, uppercase, then peel off label, opcode, and operands in turn.

use super::{Instruction, Opcode};
use crate::stage::Stage;

/// Parses a single instruction-file line into an [`Instruction`].
///
/// `line_number` is 1-based. Blank lines or lines with no recognizable
/// opcode parse to a non-existent instruction that is retained positionally
/// but never dispatched.
pub fn parse_line(line_number: usize, raw_line: &str) -> Instruction {
    // Bars are stripped before `original_line` is captured, matching the
    // original's own read_instruction_line order, so the rendered output
    // table never echoes bar separators back (or pads on their length).
    let original_line = remove_bars(&remove_cr_and_lf(raw_line));

    let mut line = trim(&original_line);
    line = line.to_uppercase();

    let label = extract_label(&mut line);
    let opcode_str = extract_opcode(&mut line);
    let opcode = Opcode::from_mnemonic(&opcode_str);

    let mut instr = Instruction::non_existent(line_number, original_line);
    instr.label = label;

    if opcode.is_none() {
        // No recognizable opcode: retained positionally, never dispatched.
        return instr;
    }

    instr.exists = true;
    instr.opcode = opcode;
    let opcode = opcode.unwrap();

    let (arg1, arg2, arg3) = extract_arguments(&mut line);
    instr.arg1 = arg1.clone();
    instr.arg2 = arg2.clone();
    instr.arg3 = arg3.clone();

    classify_operands(&mut instr, opcode, &arg1, &arg2, &arg3);

    instr.in_stage = Stage::If;
    instr
}

/// Fills in `result_reg`/`source_reg1`/`source_reg2` and the derived
/// classification flags for a parsed opcode + operand triple.
fn classify_operands(
    instr: &mut Instruction,
    opcode: Opcode,
    arg1: &str,
    arg2: &str,
    arg3: &str,
) {
    instr.writes_to_register = opcode.writes_to_register();
    instr.has_source_regs = opcode.has_source_regs();
    instr.is_branch = opcode.is_branch();

    match opcode {
        Opcode::Lw => {
            // {rd, off(rs)}
            instr.result_reg = arg1.to_string();
            instr.source_reg1 = register_from_address(arg2);
        }
        Opcode::Sw => {
            // {rs, off(rt)}
            instr.source_reg1 = arg1.to_string();
            instr.source_reg2 = register_from_address(arg2);
        }
        Opcode::Li => {
            // {rd, imm}
            instr.result_reg = arg1.to_string();
        }
        Opcode::Add | Opcode::Mult | Opcode::Sub => {
            // {rd, rs, rt}
            instr.result_reg = arg1.to_string();
            instr.source_reg1 = arg2.to_string();
            instr.source_reg2 = arg3.to_string();
        }
        Opcode::Addi | Opcode::Multi | Opcode::Subi => {
            // {rd, rs, imm}
            instr.result_reg = arg1.to_string();
            instr.source_reg1 = arg2.to_string();
        }
        Opcode::Beq | Opcode::Bne => {
            // {rs, rt, label/#}
            instr.source_reg1 = arg1.to_string();
            instr.source_reg2 = arg2.to_string();
        }
        Opcode::J | Opcode::Hlt => {
            // no operands carry register dependencies
        }
    }
}

/// Strips carriage returns / line feeds, replacing them with a space (as
/// the original does, rather than removing them outright).
fn remove_cr_and_lf(line: &str) -> String {
    line.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }).collect()
}

/// Removes `|` separators anywhere on the line.
fn remove_bars(line: &str) -> String {
    line.chars().filter(|&c| c != '|').collect()
}

/// Trims leading/trailing whitespace.
fn trim(line: &str) -> String {
    line.trim().to_string()
}

/// Peels off a leading `LABEL:` prefix, if present.
fn extract_label(line: &mut String) -> Option<String> {
    if let Some(pos) = line.find(':') {
        let label = line[..pos].to_string();
        *line = trim(&line[pos + 1..]);
        Some(label)
    } else {
        None
    }
}

/// Greedily matches the longest valid opcode mnemonic prefix of `line`.
/// Returns the empty string if no prefix of `line` is a valid mnemonic.
fn extract_opcode(line: &mut String) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut best_len = 0usize;

    for k in 1..=chars.len() {
        let candidate: String = chars[..k].iter().collect();
        if Opcode::from_mnemonic(&candidate).is_some() {
            best_len = k;
        }
    }

    let opcode_str: String = chars[..best_len].iter().collect();
    *line = trim(&chars[best_len..].iter().collect::<String>());
    opcode_str
}

/// Splits the remaining line on commas into up to three operand strings,
/// trimming surrounding whitespace from each.
fn extract_arguments(line: &mut String) -> (String, String, String) {
    let arg1 = extract_next_argument(line);
    let arg2 = extract_next_argument(line);
    let arg3 = extract_next_argument(line);
    (arg1, arg2, arg3)
}

fn extract_next_argument(line: &mut String) -> String {
    *line = trim(line);
    if line.is_empty() {
        return String::new();
    }
    match line.find(',') {
        Some(pos) => {
            let next_arg = line[..pos].trim().to_string();
            *line = line[pos + 1..].to_string();
            next_arg
        }
        None => {
            let next_arg = line.clone();
            line.clear();
            next_arg
        }
    }
}

/// Extracts the register token out of an `imm(reg)` / `reg(imm)` address
/// expression, used to determine the source register of LW/SW memory
/// operands.
fn register_from_address(operand: &str) -> String {
    let open = operand.find('(').unwrap_or(operand.len());
    let op1 = &operand[..open];
    let rest = &operand[(open + 1).min(operand.len())..];
    let close = rest.find(')').unwrap_or(rest.len());
    let op2 = &rest[..close];

    if operand.starts_with('R') {
        op1.to_string()
    } else {
        op2.to_string()
    }
}
