//! Instruction representation

pub mod decode_helper;

/// Closed set of opcodes recognized by the assembler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    Lw,
    Sw,
    Li,
    Add,
    Addi,
    Mult,
    Multi,
    Sub,
    Subi,
    Beq,
    Bne,
    J,
    Hlt,
}

impl Opcode {
    /// Every mnemonic recognized by the parser.
    pub const ALL: [(&'static str, Opcode); 13] = [
        ("LW", Opcode::Lw),
        ("SW", Opcode::Sw),
        ("LI", Opcode::Li),
        ("ADD", Opcode::Add),
        ("ADDI", Opcode::Addi),
        ("MULT", Opcode::Mult),
        ("MULTI", Opcode::Multi),
        ("SUB", Opcode::Sub),
        ("SUBI", Opcode::Subi),
        ("BEQ", Opcode::Beq),
        ("BNE", Opcode::Bne),
        ("J", Opcode::J),
        ("HLT", Opcode::Hlt),
    ];

    pub fn mnemonic(self) -> &'static str {
        Self::ALL.iter().find(|(_, op)| *op == self).map(|(s, _)| *s).unwrap()
    }

    pub fn from_mnemonic(s: &str) -> Option<Opcode> {
        Self::ALL.iter().find(|(name, _)| *name == s).map(|(_, op)| *op)
    }

    /// True for opcodes that write a result into `result_reg`.
    pub fn writes_to_register(self) -> bool {
        matches!(
            self,
            Opcode::Lw
                | Opcode::Li
                | Opcode::Add
                | Opcode::Addi
                | Opcode::Mult
                | Opcode::Multi
                | Opcode::Sub
                | Opcode::Subi
        )
    }

    /// False for opcodes that never read a register operand.
    pub fn has_source_regs(self) -> bool {
        !matches!(self, Opcode::Li | Opcode::J | Opcode::Hlt)
    }

    pub fn is_branch(self) -> bool {
        matches!(self, Opcode::Beq | Opcode::Bne)
    }
}

/// A register name, immediate literal, address expression, or label token
/// as it appeared in the source line (not yet resolved to a value).
pub type Operand = String;

/// A single parsed program line.
///
/// Parse-time attributes (`line_number`, `original_line`, `opcode`, ...) are
/// set once during parsing and never change. Runtime attributes
/// (`in_stage`, `mem_count`, `has_data_hazard`, ...) are mutated by the
/// pipeline engine over the instruction's lifetime in the pipeline.
#[derive(Clone, Debug)]
pub struct Instruction {
    // --- parse-time, immutable ---
    pub line_number: usize,
    pub original_line: String,
    pub label: Option<String>,
    pub opcode: Option<Opcode>,
    pub arg1: Operand,
    pub arg2: Operand,
    pub arg3: Operand,
    pub result_reg: Operand,
    pub source_reg1: Operand,
    pub source_reg2: Operand,
    pub writes_to_register: bool,
    pub has_source_regs: bool,
    pub is_branch: bool,
    pub exists: bool,

    // --- runtime, mutable ---
    pub in_stage: crate::stage::Stage,
    pub instr_index: usize,
    pub mem_count: u8,
    pub has_data_hazard: bool,
    pub nearest_data_hazard: usize,
    pub already_wrote_result: bool,
    pub has_completed: bool,
    pub finish_log: [i64; crate::stage::NUM_STAGES],
}

impl Instruction {
    /// A non-existent placeholder instruction, used for blank lines, lines
    /// with no recognizable opcode, and a fetch attempted past the end of
    /// the program.
    pub fn non_existent(line_number: usize, original_line: String) -> Self {
        Self {
            line_number,
            original_line,
            label: None,
            opcode: None,
            arg1: String::new(),
            arg2: String::new(),
            arg3: String::new(),
            result_reg: String::new(),
            source_reg1: String::new(),
            source_reg2: String::new(),
            writes_to_register: false,
            has_source_regs: false,
            is_branch: false,
            exists: false,
            in_stage: crate::stage::Stage::If,
            instr_index: 0,
            mem_count: 0,
            has_data_hazard: false,
            nearest_data_hazard: 0,
            already_wrote_result: false,
            has_completed: false,
            finish_log: [-1; crate::stage::NUM_STAGES],
        }
    }
}
