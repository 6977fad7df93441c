//! Output Formatter: renders the stage-completion table
//!
//! One row per dispatched instruction: the original source line padded to
//! column 35, followed by five tab-separated `finish_log` entries for IF,
//! ID, EX3, MEM, and WB. EX1 and EX2 are intentionally omitted.

use std::fmt::Write as _;

use crate::instruction::Instruction;
use crate::stage::Stage;

const NUM_PAD_SPACES: usize = 35;
const HEADER: &str = "Cycle Number for Each Stage        IF\tID\tEX3\tMEM\tWB";

/// Renders the stage-completion table for `history` into a single string,
/// terminated with a trailing newline after the last row.
pub fn render(history: &[Instruction]) -> String {
    let mut out = String::new();
    writeln!(out, "{HEADER}").unwrap();

    for instr in history {
        out.push_str(&instr.original_line);

        let pad = NUM_PAD_SPACES.saturating_sub(instr.original_line.len());
        for _ in 0..pad {
            out.push(' ');
        }

        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            instr.finish_log[Stage::If.index()],
            instr.finish_log[Stage::Id.index()],
            instr.finish_log[Stage::Ex3.index()],
            instr.finish_log[Stage::Mem.index()],
            instr.finish_log[Stage::Wb.index()],
        )
        .unwrap();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::decode_helper::parse_line;

    #[test]
    fn renders_header_and_padded_rows() {
        let mut instr = parse_line(1, "LI R1, 5");
        instr.finish_log = [1, 2, 3, 4, 5, 6, 7];
        let rendered = render(&[instr]);
        let mut lines = rendered.lines();
        assert_eq!(lines.next().unwrap(), HEADER);
        let row = lines.next().unwrap();
        assert!(row.starts_with("LI R1, 5"));
        assert!(row.ends_with("1\t2\t5\t6\t7"));
    }

    #[test]
    fn empty_history_renders_only_the_header() {
        let rendered = render(&[]);
        assert_eq!(rendered.trim_end(), HEADER);
    }
}
