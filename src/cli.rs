//! CLI argument definition
//!
//! Positional instruction/data/output paths all default when omitted,
//! matching the original's all-or-nothing default behavior (fewer than
//! three arguments on the command line means every one defaults).

use std::path::PathBuf;

pub const DEFAULT_INSTRUCTION_FILE: &str = "default_inst.txt";
pub const DEFAULT_DATA_FILE: &str = "default_data_segment.txt";
pub const DEFAULT_OUTPUT_FILE: &str = "default_output.txt";

/// Cycle budget used when `--unlimited` is not given, matching the
/// original's `OPTIONAL_CYCLE_LIMIT`.
pub const DEFAULT_CYCLE_LIMIT: u32 = 100;

xflags::xflags! {
    /// 7-stage in-order pipeline simulator for a small MIPS-like ISA.
    cmd SimArgs {
        /// Path to the assembly instruction file.
        optional instruction_file: PathBuf

        /// Path to the initial data-memory image.
        optional data_file: PathBuf

        /// Path to write the stage-completion table to.
        optional output_file: PathBuf

        /// Maximum number of cycles to simulate before giving up.
        optional --cycle-limit limit: u32

        /// Disables the cycle budget entirely, matching the original's
        /// dead `ENABLE_UNLIMITED_INPUT` constant.
        optional --unlimited

        /// Enables verbose mode, tracing each cycle's fetch/stage-advance
        /// decisions to stderr.
        optional -v, --verbose
    }
}

/// Resolved, defaulted CLI arguments ready for [`crate::runner::run`].
pub struct RunArgs {
    pub instruction_file: PathBuf,
    pub data_file: PathBuf,
    pub output_file: PathBuf,
    pub cycle_limit: Option<u32>,
    pub verbose: bool,
}

impl From<SimArgs> for RunArgs {
    fn from(args: SimArgs) -> Self {
        // The original treats "fewer than 3 positional args" as
        // all-or-nothing: if any of the three is missing, every one
        // defaults. Reproduced here by defaulting as a group.
        let all_present =
            args.instruction_file.is_some() && args.data_file.is_some() && args.output_file.is_some();

        let (instruction_file, data_file, output_file) = if all_present {
            (args.instruction_file.unwrap(), args.data_file.unwrap(), args.output_file.unwrap())
        } else {
            (
                PathBuf::from(DEFAULT_INSTRUCTION_FILE),
                PathBuf::from(DEFAULT_DATA_FILE),
                PathBuf::from(DEFAULT_OUTPUT_FILE),
            )
        };

        let cycle_limit = if args.unlimited { None } else { Some(args.cycle_limit.unwrap_or(DEFAULT_CYCLE_LIMIT)) };

        Self { instruction_file, data_file, output_file, cycle_limit, verbose: args.verbose }
    }
}
