//! Basic blocks and their sub-blocks
use riscv_decode::InstructionClass;
use serde::Serialize;

use crate::program::Program;

pub type SubBlockId = usize;

/// A straight-line run from a leader up to and including its control transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicBlock {
    pub start_pc: u32,
    /// Address of the last instruction, inclusive
    pub end_pc: u32,
    /// Execution count of the terminating instruction
    pub frequency: u64,
    /// Instruction addresses in order
    pub pcs: Vec<u32>,
}

impl BasicBlock {
    pub fn len(&self) -> usize {
        self.pcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcs.is_empty()
    }

    pub fn contains(&self, pc: u32) -> bool {
        self.pcs.binary_search(&pc).is_ok()
    }
}

/// Part of a basic block in which every instruction but the last has one class
///
/// Fused instructions are built from a single sub-block, so no candidate ever
/// spans a memory access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubBlock {
    pub id: SubBlockId,
    /// Index of the owning basic block
    pub block: usize,
    pub pcs: Vec<u32>,
    /// Class of the first instruction
    pub class: InstructionClass,
    pub frequency: u64,
}

fn same_kind(a: InstructionClass, b: InstructionClass) -> bool {
    matches!(
        (a, b),
        (InstructionClass::Arithmetic, InstructionClass::Arithmetic)
            | (InstructionClass::Memory, InstructionClass::Memory)
            | (InstructionClass::Control(_), InstructionClass::Control(_))
    )
}

impl SubBlock {
    pub fn start_pc(&self) -> u32 {
        self.pcs[0]
    }

    pub fn end_pc(&self) -> u32 {
        self.pcs[self.pcs.len() - 1]
    }

    pub fn is_arithmetic(&self) -> bool {
        self.class == InstructionClass::Arithmetic
    }

    /// Split `block` wherever the instruction class changes
    ///
    /// A control transfer of a different class joins the run before it and closes
    /// it. Ids are handed out consecutively from `first_id`.
    pub fn partition(
        block: &BasicBlock,
        block_index: usize,
        program: &Program,
        first_id: SubBlockId,
    ) -> Vec<SubBlock> {
        let mut sub_blocks = Vec::new();
        let mut run: Option<(InstructionClass, Vec<u32>)> = None;

        let mut close = |class: InstructionClass, pcs: Vec<u32>| {
            sub_blocks.push(SubBlock {
                id: first_id + sub_blocks.len(),
                block: block_index,
                pcs,
                class,
                frequency: block.frequency,
            });
        };

        for &pc in &block.pcs {
            let Some(instruction) = program.instruction(pc) else {
                continue;
            };
            let class = instruction.class();
            run = match run.take() {
                None => Some((class, vec![pc])),
                Some((current, mut pcs)) if same_kind(current, class) => {
                    pcs.push(pc);
                    Some((current, pcs))
                }
                Some((current, mut pcs)) if instruction.is_control_transfer() => {
                    pcs.push(pc);
                    close(current, pcs);
                    None
                }
                Some((current, pcs)) => {
                    close(current, pcs);
                    Some((class, vec![pc]))
                }
            };
        }
        if let Some((class, pcs)) = run {
            close(class, pcs);
        }
        sub_blocks
    }
}

#[cfg(test)]
mod tests {
    use riscv_decode::Isa;

    use super::*;

    #[test]
    fn test_partition_splits_at_memory_accesses() {
        let mut program = Program::new(Isa::rv32imc());
        // lw a0,4(sp) ; lw a1,4(sp) ; addi a0,a0,1 ; sw a0,4(sp) ; ret
        for (pc, word) in
            [(0, "00412503"), (4, "00412583"), (8, "00150513"), (12, "00a12223"), (16, "00008067")]
        {
            program.add_instruction(pc, word, 7).unwrap();
        }
        let blocks = program.basic_blocks();
        assert_eq!(blocks.len(), 1);

        let sub_blocks = SubBlock::partition(&blocks[0], 0, &program, 5);
        let pcs: Vec<_> = sub_blocks.iter().map(|sb| sb.pcs.clone()).collect();
        assert_eq!(pcs, vec![vec![0, 4], vec![8], vec![12, 16]]);
        assert_eq!(sub_blocks.iter().map(|sb| sb.id).collect::<Vec<_>>(), vec![5, 6, 7]);
        assert_eq!(sub_blocks[2].class, InstructionClass::Memory);
        assert!(sub_blocks[1].is_arithmetic());
        assert!(sub_blocks.iter().all(|sb| sb.frequency == 7));
        let covered: Vec<u32> = sub_blocks.iter().flat_map(|sb| sb.pcs.clone()).collect();
        assert_eq!(covered, blocks[0].pcs);
    }
}
