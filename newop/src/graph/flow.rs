use std::collections::HashMap;

use indexmap::IndexSet;
use tracing::debug;

use crate::{
    block::{SubBlock, SubBlockId},
    program::Program,
};

/// Control flow between sub-blocks
///
/// A sub-block falls through to the sub-block starting right after its last
/// instruction, whatever that instruction is. A PC-relative transfer also leads to
/// the sub-block starting at its target. Indirect targets are not resolved.
#[derive(Debug, Clone, Default)]
pub struct SubBlockGraph {
    successors: Vec<IndexSet<SubBlockId>>,
    predecessors: Vec<IndexSet<SubBlockId>>,
}

impl SubBlockGraph {
    pub fn with_nodes(count: usize) -> Self {
        Self {
            successors: vec![IndexSet::new(); count],
            predecessors: vec![IndexSet::new(); count],
        }
    }

    pub fn add_edge(&mut self, from: SubBlockId, to: SubBlockId) {
        if self.successors[from].insert(to) {
            self.predecessors[to].insert(from);
        }
    }

    /// `sub_blocks` must be indexed by their ids
    pub fn build(program: &Program, sub_blocks: &[SubBlock]) -> Self {
        let mut graph = Self::with_nodes(sub_blocks.len());
        let by_start: HashMap<u32, SubBlockId> =
            sub_blocks.iter().map(|sub_block| (sub_block.start_pc(), sub_block.id)).collect();

        for sub_block in sub_blocks {
            let end = sub_block.end_pc();
            let Some(last) = program.instruction(end) else {
                continue;
            };
            let fall_through = end.wrapping_add(last.size().bytes());
            let targets = std::iter::once(fall_through).chain(last.branch_target(end));
            for target in targets {
                if let Some(&next) = by_start.get(&target) {
                    graph.add_edge(sub_block.id, next);
                }
            }
        }
        debug!("Sub-block graph has {} nodes and {} edges", graph.len(), graph.edge_count());
        graph
    }

    pub fn len(&self) -> usize {
        self.successors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(IndexSet::len).sum()
    }

    pub fn successors(&self, id: SubBlockId) -> impl Iterator<Item = SubBlockId> + '_ {
        self.successors[id].iter().copied()
    }

    pub fn predecessors(&self, id: SubBlockId) -> impl Iterator<Item = SubBlockId> + '_ {
        self.predecessors[id].iter().copied()
    }
}
