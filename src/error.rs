//! Top-level error type for the simulator

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("failed to read instruction file '{0}': {1}")]
    InstructionFileError(PathBuf, #[source] std::io::Error),

    #[error("failed to read data file '{0}': {1}")]
    DataFileError(PathBuf, #[source] std::io::Error),

    #[error("failed to write output file '{0}': {1}")]
    OutputFileError(PathBuf, #[source] std::io::Error),

    #[error("unknown label or register operand '{0}' on line {1}")]
    UnresolvedOperand(String, usize),

    #[error("program counter {0} is out of bounds (program has {1} lines)")]
    PcOutOfBounds(usize, usize),

    #[error("cycle budget of {0} cycles exceeded without reaching HLT")]
    CycleBudgetExceeded(u32),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
