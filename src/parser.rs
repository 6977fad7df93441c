//! Assembly Parser: loads the instruction file and the data-memory image
//!
//! A missing file is not a fatal error: a diagnostic is printed and the
//! caller gets an empty `Program`/`DataMemory`, matching the original's
//! "File could not be opened!" behavior.

use std::path::Path;

use crate::data_memory::DataMemory;
use crate::instruction::decode_helper::parse_line;
use crate::program::Program;

/// Reads and parses the instruction file at `path` into a [`Program`].
/// Returns an empty program if the file cannot be read.
pub fn load_program(path: &Path) -> Program {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => {
            eprintln!("File could not be opened!");
            return Program::default();
        }
    };

    let instructions =
        contents.lines().enumerate().map(|(i, line)| parse_line(i + 1, line)).collect();
    Program::new(instructions)
}

/// Reads the data file at `path`, one binary digit string per line, into
/// a [`DataMemory`]. Returns an empty data memory if the file cannot be
/// read.
pub fn load_data(path: &Path) -> DataMemory {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => {
            eprintln!("File could not be opened!");
            return DataMemory::default();
        }
    };

    let words = contents
        .lines()
        .map(|line| u32::from_str_radix(line.trim(), 2).unwrap_or(0))
        .collect();
    DataMemory::new(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_program_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "LI R1, 5").unwrap();
        writeln!(file, "HLT").unwrap();
        let program = load_program(file.path());
        assert_eq!(program.len(), 2);
        assert!(program.instructions[0].exists);
    }

    #[test]
    fn missing_instruction_file_yields_empty_program() {
        let program = load_program(Path::new("/nonexistent/path/to/nothing.txt"));
        assert!(program.is_empty());
    }

    #[test]
    fn loads_data_from_binary_digit_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "00000000000000000000000000000101").unwrap();
        writeln!(file, "00000000000000000000000000001010").unwrap();
        let data = load_data(file.path());
        assert_eq!(data.get(0), 5);
        assert_eq!(data.get(1), 10);
    }

    #[test]
    fn missing_data_file_yields_empty_data_memory() {
        let data = load_data(Path::new("/nonexistent/path/to/nothing.txt"));
        assert!(data.is_empty());
    }
}
