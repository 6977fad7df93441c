//! Hazard Resolver: data, structural, and control hazard detection
//!
//! Modeled as a set of pure functions over the pipeline snapshot
//! (`active_instrs` + the dispatch history), consulted before every push
//! and fetch decision, per the design note that the resolver should be
//! reentrant and stateless across cycles.

use crate::instruction::{Instruction, Opcode};
use crate::stage::{Stage, NUM_MEM_CYCLES, NUM_STAGES};

/// Recomputes data-hazard flags for the current pipeline snapshot.
///
/// Detection always targets whichever instruction currently occupies IF:
/// for every producer in ID..WB that writes a register matching IF's
/// first source register, a hazard is recorded (or cleared if the
/// producer already wrote its result). Preserved verbatim from the
/// original: the comparison checks `source_reg1` twice and never
/// `source_reg2` — almost certainly a bug, but not one this
/// reimplementation corrects (see DESIGN.md).
///
/// Clearing then runs over every occupied stage, dropping a stale
/// `has_data_hazard` flag once its producer has written its result or is
/// more than `NUM_STAGES - 1` instructions behind whichever instruction
/// currently occupies IF — preserved verbatim, the distance is always
/// measured from IF's occupant, even when clearing a flag on an
/// instruction sitting in an earlier stage.
pub fn update_data_hazards(active: &[Option<usize>; NUM_STAGES], history: &mut [Instruction]) {
    if let Some(if_idx) = active[Stage::If.index()] {
        if history[if_idx].exists {
            let consumer_src1 = history[if_idx].source_reg1.clone();
            for ii in Stage::Id.index()..NUM_STAGES {
                let Some(prod_idx) = active[ii] else { continue };
                if !history[prod_idx].exists || !history[prod_idx].writes_to_register {
                    continue;
                }
                // Preserved verbatim: compares against source_reg1 only (see above).
                if history[prod_idx].result_reg == consumer_src1 {
                    if history[prod_idx].already_wrote_result {
                        history[if_idx].has_data_hazard = false;
                    } else {
                        history[if_idx].has_data_hazard = true;
                        history[if_idx].nearest_data_hazard = history[prod_idx].instr_index;
                    }
                }
            }
        }
    }

    // Preserved verbatim: the distance used to clear a stale hazard is
    // always measured from whichever instruction currently occupies IF,
    // not from the instruction the flag is being cleared on.
    let if_index = active[Stage::If.index()].map(|i| history[i].instr_index);

    for ii in 0..NUM_STAGES {
        let Some(idx) = active[ii] else { continue };
        if !history[idx].exists || !history[idx].has_data_hazard {
            continue;
        }
        let nearest = history[idx].nearest_data_hazard;
        let producer_wrote = history.get(nearest).is_some_and(|p| p.already_wrote_result);
        let cleared_by_distance = if_index.is_some_and(|if_idx| {
            (if_idx as i64 - nearest as i64) > (NUM_STAGES - 1) as i64
        });
        if cleared_by_distance || producer_wrote {
            history[idx].has_data_hazard = false;
        }
    }
}

/// True whenever ID holds an existing branch — fetch is suppressed while
/// this holds.
pub fn control_hazard_exists(
    active: &[Option<usize>; NUM_STAGES],
    history: &[Instruction],
) -> bool {
    active[Stage::Id.index()].map(|i| history[i].exists && history[i].is_branch).unwrap_or(false)
}

/// True when a stall in `stage` would be enforced by a pending data
/// hazard: at IF for branches, at ID for non-branch instructions with
/// source registers.
pub fn is_susceptible_to_data_hazard(
    stage: Stage,
    active: &[Option<usize>; NUM_STAGES],
    history: &[Instruction],
) -> bool {
    match stage {
        Stage::If => active[stage.index()].map(|i| history[i].is_branch).unwrap_or(false),
        Stage::Id => active[stage.index()]
            .map(|i| history[i].has_source_regs && !history[i].is_branch)
            .unwrap_or(false),
        _ => false,
    }
}

/// True when the stage immediately downstream of `stage` is occupied.
pub fn has_structural_hazard(stage: Stage, active: &[Option<usize>; NUM_STAGES]) -> bool {
    match stage.next() {
        None => false,
        Some(next) => active[next.index()].is_some(),
    }
}

/// Whether the instruction in `stage` may advance to the next stage this
/// cycle.
pub fn can_push(
    stage: Stage,
    active: &[Option<usize>; NUM_STAGES],
    history: &[Instruction],
) -> bool {
    if stage == Stage::Wb {
        return true;
    }
    let Some(idx) = active[stage.index()] else { return false };

    if has_structural_hazard(stage, active) {
        return false;
    }
    if stage == Stage::Mem && history[idx].mem_count < NUM_MEM_CYCLES {
        return false;
    }
    if is_susceptible_to_data_hazard(stage, active, history) && history[idx].has_data_hazard {
        return false;
    }
    true
}

/// True for the stage at which an operation finalizes mid-pipeline (ID
/// for HLT's decode, EX1 for branches/jumps, WB always).
pub fn finish_op_this_stage(
    stage: Stage,
    active: &[Option<usize>; NUM_STAGES],
    history: &[Instruction],
) -> bool {
    match stage {
        Stage::Id => {
            active[stage.index()].map(|i| history[i].opcode == Some(Opcode::Hlt)).unwrap_or(false)
        }
        Stage::Ex1 => active[stage.index()]
            .map(|i| matches!(history[i].opcode, Some(Opcode::J) | Some(Opcode::Beq) | Some(Opcode::Bne)))
            .unwrap_or(false),
        Stage::Wb => true,
        _ => false,
    }
}

/// True once an HLT is in ID and every later stage is occupied by an
/// already-completed instruction. An empty downstream stage does not
/// satisfy this — matches the original exactly, where a drained pipeline
/// behind HLT never reaches this state until WB carries a completed
/// instruction all the way through.
pub fn program_complete(active: &[Option<usize>; NUM_STAGES], history: &[Instruction]) -> bool {
    let id_is_hlt = active[Stage::Id.index()]
        .map(|i| history[i].exists && history[i].opcode == Some(Opcode::Hlt))
        .unwrap_or(false);
    if !id_is_hlt {
        return false;
    }
    [Stage::Ex1, Stage::Ex2, Stage::Ex3, Stage::Mem, Stage::Wb]
        .iter()
        .all(|s| active[s.index()].is_some_and(|i| history[i].has_completed))
}
