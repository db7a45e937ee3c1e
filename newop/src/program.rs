//! Address-indexed decoded instructions and basic-block discovery
use std::{
    collections::{BTreeMap, BTreeSet},
    io::BufRead,
};

use rayon::prelude::*;
use riscv_decode::{Decoder, Instruction, Isa};
use tracing::{debug, warn};

use crate::{
    block::{BasicBlock, SubBlock},
    histogram::{self, Record},
    Error,
};

/// Decoded instructions keyed by pc, with their execution counts
pub struct Program {
    decoder: Decoder,
    instructions: BTreeMap<u32, Instruction>,
    frequencies: BTreeMap<u32, u64>,
}

impl Program {
    pub fn new(isa: Isa) -> Self {
        Self {
            decoder: Decoder::new(&isa),
            instructions: BTreeMap::new(),
            frequencies: BTreeMap::new(),
        }
    }

    /// Empty program for an ISA configuration string such as `"32IMC"`
    pub fn with_isa(isa: &str) -> Result<Self, Error> {
        Ok(Self::new(isa.parse()?))
    }

    /// Decode `hex` and record it at `pc`
    ///
    /// On failure nothing is recorded for `pc`.
    pub fn add_instruction(
        &mut self,
        pc: u32,
        hex: &str,
        frequency: u64,
    ) -> Result<(), riscv_decode::Error> {
        let instruction = self.decoder.decode_hex(hex)?;
        self.add_decoded(pc, instruction, frequency);
        Ok(())
    }

    pub fn add_decoded(&mut self, pc: u32, instruction: Instruction, frequency: u64) {
        self.instructions.insert(pc, instruction);
        self.frequencies.insert(pc, frequency);
    }

    /// Decode a batch of records in parallel
    ///
    /// Records that fail to decode are logged and skipped. Returns how many were skipped.
    pub fn load(&mut self, records: Vec<Record>) -> usize {
        let decoded: Vec<_> = records
            .into_par_iter()
            .map(|record| {
                let result = self.decoder.decode_hex(&record.hex);
                (record, result)
            })
            .collect();

        let mut skipped = 0;
        for (record, result) in decoded {
            match result {
                Ok(instruction) => self.add_decoded(record.pc, instruction, record.frequency),
                Err(err) => {
                    warn!("Skipping {:#x} ({}): {}", record.pc, record.hex, err);
                    skipped += 1;
                }
            }
        }
        skipped
    }

    /// Build a program from histogram text
    pub fn from_histogram<R: BufRead>(reader: R, isa: Isa) -> Result<Self, Error> {
        let mut program = Self::new(isa);
        let records = histogram::parse(reader)?;
        let total = records.len();
        let skipped = program.load(records);
        debug!("Loaded {} of {} histogram records", total - skipped, total);
        Ok(program)
    }

    pub fn instruction(&self, pc: u32) -> Option<&Instruction> {
        self.instructions.get(&pc)
    }

    /// Execution count at `pc`, zero when unknown
    pub fn frequency(&self, pc: u32) -> u64 {
        self.frequencies.get(&pc).copied().unwrap_or(0)
    }

    pub fn instructions(&self) -> impl Iterator<Item = (u32, &Instruction)> {
        self.instructions.iter().map(|(pc, instruction)| (*pc, instruction))
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// `pc: disassembly` for every instruction in address order
    pub fn listing(&self) -> Vec<String> {
        self.instructions().map(|(pc, instruction)| format!("{pc:#x}: {instruction}")).collect()
    }

    /// Sum of the execution counts of every instruction inside `blocks`
    pub fn total_cycles(&self, blocks: &[BasicBlock]) -> u64 {
        blocks.iter().flat_map(|block| &block.pcs).map(|&pc| self.frequency(pc)).sum()
    }

    fn next_pc(pc: u32, instruction: &Instruction) -> u32 {
        pc.wrapping_add(instruction.size().bytes())
    }

    /// Leader addresses of every basic block
    ///
    /// Scans straight-line runs from a work-list of leaders. A control transfer makes
    /// its fall-through address and, when it is PC-relative, its target into leaders.
    /// Indirect targets are unknown and add nothing. Once the work-list drains,
    /// discovery restarts from the lowest address not yet scanned.
    pub fn leaders(&self) -> BTreeSet<u32> {
        let mut leaders = BTreeSet::new();
        let mut visited = BTreeSet::new();

        while let Some(&seed) = self.instructions.keys().find(|pc| !visited.contains(*pc)) {
            leaders.insert(seed);
            let mut worklist = vec![seed];

            while let Some(leader) = worklist.pop() {
                let mut pc = leader;
                while let Some(instruction) = self.instructions.get(&pc) {
                    if !visited.insert(pc) {
                        break;
                    }
                    if instruction.is_control_transfer() {
                        let fall_through = Self::next_pc(pc, instruction);
                        let targets =
                            std::iter::once(fall_through).chain(instruction.branch_target(pc));
                        for target in targets {
                            if self.instructions.contains_key(&target) && leaders.insert(target) {
                                worklist.push(target);
                            }
                        }
                        break;
                    }
                    pc = Self::next_pc(pc, instruction);
                }
            }
        }
        leaders
    }

    /// Materialize one block per leader
    ///
    /// A block runs until the next leader or the first address with no instruction.
    pub fn basic_blocks(&self) -> Vec<BasicBlock> {
        let leaders = self.leaders();
        let blocks: Vec<BasicBlock> = leaders
            .iter()
            .filter_map(|&leader| {
                let mut pcs = Vec::new();
                let mut pc = leader;
                while let Some(instruction) = self.instructions.get(&pc) {
                    pcs.push(pc);
                    pc = Self::next_pc(pc, instruction);
                    if leaders.contains(&pc) {
                        break;
                    }
                }
                let end_pc = *pcs.last()?;
                let frequency = self.frequency(end_pc);
                Some(BasicBlock { start_pc: leader, end_pc, frequency, pcs })
            })
            .collect();
        debug!("Found {} basic blocks over {} instructions", blocks.len(), self.len());
        blocks
    }

    /// Sub-blocks of every block, with ids unique across the program
    pub fn sub_blocks(&self, blocks: &[BasicBlock]) -> Vec<SubBlock> {
        let mut sub_blocks = Vec::new();
        for (index, block) in blocks.iter().enumerate() {
            let first_id = sub_blocks.len();
            sub_blocks.extend(SubBlock::partition(block, index, self, first_id));
        }
        debug!("Partitioned {} basic blocks into {} sub-blocks", blocks.len(), sub_blocks.len());
        sub_blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(words: &[(u32, &str)]) -> Program {
        let mut program = Program::new(Isa::rv32imc());
        for &(pc, word) in words {
            program.add_instruction(pc, word, 3).unwrap();
        }
        program
    }

    #[test]
    fn test_jump_target_and_fall_through_are_leaders() {
        // 0: j 8 ; 4: addi a0,a0,1 ; 8: addi a0,a0,1 ; 0x40: addi a0,a0,1
        let program =
            program(&[(0, "0080006f"), (4, "00150513"), (8, "00150513"), (0x40, "00150513")]);
        assert_eq!(program.leaders(), BTreeSet::from([0, 4, 8, 0x40]));

        let blocks = program.basic_blocks();
        let ranges: Vec<_> = blocks.iter().map(|b| (b.start_pc, b.end_pc)).collect();
        assert_eq!(ranges, vec![(0, 0), (4, 4), (8, 8), (0x40, 0x40)]);
        assert_eq!(program.total_cycles(&blocks), 12);
    }

    #[test]
    fn test_backward_branch_into_straight_line_run() {
        // 0, 4, 8: addi a0,a0,1 ; 12: beq a0,a1,-8 ; 16: ret
        let program = program(&[
            (0, "00150513"),
            (4, "00150513"),
            (8, "00150513"),
            (12, "feb50ce3"),
            (16, "00008067"),
        ]);
        assert_eq!(program.leaders(), BTreeSet::from([0, 4, 16]));

        let blocks = program.basic_blocks();
        let ranges: Vec<_> = blocks.iter().map(|b| (b.start_pc, b.end_pc)).collect();
        assert_eq!(ranges, vec![(0, 0), (4, 12), (16, 16)]);
        assert_eq!(blocks[1].pcs, vec![4, 8, 12]);
    }

    #[test]
    fn test_mixed_sizes_step_by_instruction_size() {
        // 0: c.li a0,5 ; 2: add a5,a5,a4 ; 6: c.jr ra
        let program = program(&[(0, "4515"), (2, "00e787b3"), (6, "8082")]);
        let blocks = program.basic_blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].pcs, vec![0, 2, 6]);
        assert_eq!(blocks[0].frequency, 3);
        assert_eq!(program.listing()[1], "0x2: add a5,a5,a4");
    }

    #[test]
    fn test_failed_decodes_are_skipped() {
        let mut program = Program::new(Isa::new());
        let records = vec![
            Record { pc: 0, hex: "00e787b3".to_string(), frequency: 1 },
            Record { pc: 4, hex: "02c58533".to_string(), frequency: 1 },
            Record { pc: 8, hex: "xyz".to_string(), frequency: 1 },
        ];
        assert_eq!(program.load(records), 2);
        assert_eq!(program.len(), 1);
        assert!(program.instruction(4).is_none());
        assert_eq!(program.frequency(4), 0);
        assert!(program.add_instruction(12, "0000", 1).is_err());
        assert!(Program::with_isa("32Q").is_err());
    }
}
