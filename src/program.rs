//! Parsed program: ordered instructions plus a label -> line-number map

use std::collections::HashMap;

use crate::instruction::Instruction;

/// The parsed instruction list and label map produced by [`crate::parser`].
///
/// Instructions live at `position = line_number - 1`. Labels resolve to
/// 1-based line numbers; every line number's decimal string is also
/// registered as a label of itself, so a numeric branch target (`J 12`)
/// resolves the same way a named label would.
#[derive(Default)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub labels: HashMap<String, usize>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        let mut labels = HashMap::new();
        for instr in &instructions {
            labels.insert(instr.line_number.to_string(), instr.line_number);
            if let Some(label) = &instr.label {
                if !label.is_empty() {
                    labels.insert(label.clone(), instr.line_number);
                }
            }
        }
        Self { instructions, labels }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
