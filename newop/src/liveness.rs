//! Register liveness across sub-blocks
//!
//! A register is live into a sub-block when the sub-block reads it before writing
//! it, or passes it through untouched to a successor that needs it:
//!
//! `live_in(b) = uses(b) ∪ (∪ live_in(s) for s in succ(b) − kills(b))`
//!
//! The sets are solved with a work-list until nothing changes.
use std::collections::BTreeSet;

use riscv_decode::Register;
use tracing::debug;

use crate::{
    block::{SubBlock, SubBlockId},
    graph::SubBlockGraph,
    program::Program,
};

/// Converged liveness of every sub-block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Liveness {
    uses: Vec<BTreeSet<Register>>,
    kills: Vec<BTreeSet<Register>>,
    live_in: Vec<BTreeSet<Register>>,
    successors: Vec<Vec<SubBlockId>>,
    loop_back_edges: Vec<(SubBlockId, SubBlockId)>,
    iterations: usize,
}

impl Liveness {
    /// Whether a successor of `sub_block` may read the value `register` holds when
    /// `sub_block` ends
    pub fn needs_to_stay_live(&self, sub_block: SubBlockId, register: Register) -> bool {
        self.successors[sub_block].iter().any(|&next| self.live_in[next].contains(&register))
    }

    /// Registers read by `sub_block` before it writes them
    pub fn uses(&self, sub_block: SubBlockId) -> &BTreeSet<Register> {
        &self.uses[sub_block]
    }

    pub fn kills(&self, sub_block: SubBlockId) -> &BTreeSet<Register> {
        &self.kills[sub_block]
    }

    /// Registers whose incoming value `sub_block` or its successors may read
    pub fn needs_live(&self, sub_block: SubBlockId) -> &BTreeSet<Register> {
        &self.live_in[sub_block]
    }

    /// Edges from a sub-block to one discovered no later than itself
    pub fn loop_back_edges(&self) -> &[(SubBlockId, SubBlockId)] {
        &self.loop_back_edges
    }

    /// Number of sub-block updates until convergence
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

pub struct LivenessAnalyzer<'a> {
    program: &'a Program,
    sub_blocks: &'a [SubBlock],
    graph: &'a SubBlockGraph,
}

impl<'a> LivenessAnalyzer<'a> {
    /// `sub_blocks` must be indexed by their ids, and `graph` built over them
    pub fn new(program: &'a Program, sub_blocks: &'a [SubBlock], graph: &'a SubBlockGraph) -> Self {
        Self { program, sub_blocks, graph }
    }

    fn uses_and_kills(&self, sub_block: &SubBlock) -> (BTreeSet<Register>, BTreeSet<Register>) {
        let mut uses = BTreeSet::new();
        let mut kills = BTreeSet::new();
        for instruction in sub_block.pcs.iter().filter_map(|&pc| self.program.instruction(pc)) {
            for &src in instruction.src_registers() {
                if !src.is_zero() && !kills.contains(&src) {
                    uses.insert(src);
                }
            }
            kills.extend(instruction.dest_registers().iter().copied().filter(|r| !r.is_zero()));
        }
        (uses, kills)
    }

    /// Depth-first discovery order over every component, plus the edges that lead
    /// back to a sub-block discovered no later than their source
    fn discover(&self) -> (Vec<SubBlockId>, Vec<(SubBlockId, SubBlockId)>) {
        let count = self.sub_blocks.len();
        let mut discovered: Vec<Option<usize>> = vec![None; count];
        let mut order = Vec::with_capacity(count);
        let mut loop_back_edges = Vec::new();

        for start in 0..count {
            if discovered[start].is_some() {
                continue;
            }
            discovered[start] = Some(order.len());
            order.push(start);
            let mut stack = vec![(start, self.graph.successors(start).collect::<Vec<_>>(), 0)];

            while let Some((node, successors, next)) = stack.last_mut() {
                let Some(&successor) = successors.get(*next) else {
                    stack.pop();
                    continue;
                };
                *next += 1;
                let node = *node;
                match discovered[successor] {
                    Some(index) => {
                        if discovered[node].is_some_and(|current| index <= current) {
                            loop_back_edges.push((node, successor));
                        }
                    }
                    None => {
                        discovered[successor] = Some(order.len());
                        order.push(successor);
                        stack.push((successor, self.graph.successors(successor).collect(), 0));
                    }
                }
            }
        }
        (order, loop_back_edges)
    }

    pub fn run(self) -> Liveness {
        let (uses, kills): (Vec<_>, Vec<_>) =
            self.sub_blocks.iter().map(|sub_block| self.uses_and_kills(sub_block)).unzip();
        let (order, loop_back_edges) = self.discover();

        let mut live_in = uses.clone();
        let mut queued = vec![true; order.len()];
        // Backward problem: start from the most recently discovered sub-blocks
        let mut worklist = order.clone();
        let mut iterations = 0;

        while let Some(id) = worklist.pop() {
            queued[id] = false;
            iterations += 1;

            let mut updated = uses[id].clone();
            for next in self.graph.successors(id) {
                updated.extend(live_in[next].difference(&kills[id]).copied());
            }
            if updated != live_in[id] {
                live_in[id] = updated;
                for previous in self.graph.predecessors(id) {
                    if !queued[previous] {
                        queued[previous] = true;
                        worklist.push(previous);
                    }
                }
            }
        }
        debug!(
            "Liveness converged after {} updates over {} sub-blocks, {} loop-back edges",
            iterations,
            order.len(),
            loop_back_edges.len()
        );

        let successors =
            (0..self.sub_blocks.len()).map(|id| self.graph.successors(id).collect()).collect();
        Liveness { uses, kills, live_in, successors, loop_back_edges, iterations }
    }
}

#[cfg(test)]
mod tests {
    use riscv_decode::Isa;

    use super::*;

    fn analyze(words: &[(u32, &str)]) -> (Vec<SubBlock>, Liveness) {
        let mut program = Program::new(Isa::rv32imc());
        for &(pc, word) in words {
            program.add_instruction(pc, word, 1).unwrap();
        }
        let blocks = program.basic_blocks();
        let sub_blocks = program.sub_blocks(&blocks);
        let graph = SubBlockGraph::build(&program, &sub_blocks);
        let liveness = LivenessAnalyzer::new(&program, &sub_blocks, &graph).run();
        (sub_blocks, liveness)
    }

    #[test]
    fn test_loop_keeps_counter_and_bound_live() {
        // 0: addi a0,a0,1 ; 4: beq a0,a1,-4 ; 8: addi a1,a0,1
        let (sub_blocks, liveness) = analyze(&[(0, "00150513"), (4, "feb50ee3"), (8, "00150593")]);
        let a0 = Register::X(10);
        let a1 = Register::X(11);
        assert_eq!(sub_blocks.len(), 2);

        assert_eq!(liveness.uses(0), &BTreeSet::from([a0, a1]));
        assert_eq!(liveness.kills(0), &BTreeSet::from([a0]));
        assert_eq!(liveness.needs_live(1), &BTreeSet::from([a0]));
        assert_eq!(liveness.needs_live(0), &BTreeSet::from([a0, a1]));
        assert_eq!(liveness.loop_back_edges(), &[(0, 0)]);

        assert!(liveness.needs_to_stay_live(0, a0));
        assert!(liveness.needs_to_stay_live(0, a1));
        assert!(!liveness.needs_to_stay_live(1, a0));
    }

    #[test]
    fn test_loop_over_several_sub_blocks() {
        // 0: addi a2,a2,1 ; 4: addi a0,a0,1 ; 8: lw a1,0(a0) ; 12: bne a1,a3,-8 ; 16: ret
        let (sub_blocks, liveness) = analyze(&[
            (0, "00160613"),
            (4, "00150513"),
            (8, "00052583"),
            (12, "fed59ce3"),
            (16, "00008067"),
        ]);
        let a2 = Register::X(12);
        let a3 = Register::X(13);
        let pcs: Vec<_> = sub_blocks.iter().map(|sub_block| sub_block.pcs.clone()).collect();
        assert_eq!(pcs, vec![vec![0], vec![4], vec![8, 12], vec![16]]);
        assert_eq!(liveness.loop_back_edges(), &[(2, 1)]);

        // a3 is only read by the branch closing the loop body
        assert!(liveness.uses(2).contains(&a3));
        assert!(liveness.needs_live(1).contains(&a3));
        assert!(liveness.needs_live(0).contains(&a3));
        assert!(liveness.needs_to_stay_live(0, a3));
        assert!(liveness.needs_to_stay_live(2, a3));
        assert!(!liveness.needs_to_stay_live(0, a2));
        assert!(!liveness.needs_live(1).contains(&Register::X(11)));
    }

    #[test]
    fn test_live_across_memory_boundary() {
        // 0: lw a0,4(sp) ; 4: addi a1,a0,1 ; 8: addi a0,a0,1 ; 12: ret
        let (_, liveness) =
            analyze(&[(0, "00412503"), (4, "00150593"), (8, "00150513"), (12, "00008067")]);
        let a0 = Register::X(10);
        // The memory sub-block flows into the arithmetic one, which reads a0 first
        assert!(liveness.needs_to_stay_live(0, a0));
        assert!(!liveness.needs_to_stay_live(0, Register::X(11)));
        assert_eq!(liveness.needs_live(1), &BTreeSet::from([a0, Register::X(1)]));
        assert!(liveness.loop_back_edges().is_empty());
    }
}
