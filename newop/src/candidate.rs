//! Fusion candidate discovery, scoring and greedy selection
use std::collections::{BTreeSet, HashMap, HashSet};

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::{
    block::{SubBlock, SubBlockId},
    graph::{DependencyGraph, Node, NodeId},
    liveness::Liveness,
};

/// A node of an exported candidate graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportNode {
    Register { name: String },
    Instruction { mnemonic: String, label: String },
    Constant { value: i32 },
}

/// Self-contained form of a candidate graph
///
/// Edges are `(consumer, operand)` pairs of indices into `nodes`. Every immediate of
/// an instruction becomes a constant operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubgraphExport {
    pub root: usize,
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<(usize, usize)>,
}

/// A dependency closure proposed as one fused instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subgraph {
    pub sub_block: SubBlockId,
    #[serde(skip)]
    pub root: NodeId,
    pub root_pc: u32,
    #[serde(skip)]
    pub nodes: BTreeSet<NodeId>,
    /// Cycles saved across the profiled run
    pub score: u64,
    /// Longest dependency chain, register moves not counted
    pub depth: usize,
    /// Smallest and largest immediate of the fused instructions
    pub imm_range: Option<(i32, i32)>,
    pub multiply: bool,
    signature: String,
    #[serde(skip)]
    export: SubgraphExport,
}

impl Subgraph {
    fn new(
        dag: &DependencyGraph,
        root: NodeId,
        nodes: BTreeSet<NodeId>,
        root_pc: u32,
        frequency: u64,
    ) -> Self {
        let leaves = nodes.iter().filter(|&&id| dag.node(id).is_register()).count();
        let score = (nodes.len() - leaves) as u64 - 1;

        // Producers always precede their consumers, so ascending ids visit operands first
        let mut depths: HashMap<NodeId, usize> = HashMap::new();
        let mut signatures: HashMap<NodeId, String> = HashMap::new();
        for &id in &nodes {
            let Some(node) = dag.instruction(id) else {
                continue;
            };
            let operands = dag.producers(id).iter().filter(|&&p| !dag.node(p).is_register());
            let own = usize::from(!node.instruction.is_move());
            let deepest = operands.clone().filter_map(|p| depths.get(p)).max().copied();
            let depth = own + deepest.unwrap_or(0);
            depths.insert(id, depth);

            let children = operands.filter_map(|p| signatures.get(p)).sorted().join(",");
            let signature = if children.is_empty() {
                node.instruction.mnemonic().to_string()
            } else {
                format!("{}({})", node.instruction.mnemonic(), children)
            };
            signatures.insert(id, signature);
        }

        let instructions = || nodes.iter().filter_map(|&id| dag.instruction(id));
        let imm_range = instructions()
            .flat_map(|node| node.instruction.immediates().iter().copied())
            .minmax()
            .into_option();
        let multiply = instructions().any(|node| node.instruction.is_multiply());

        Self {
            sub_block: dag.sub_block(),
            root,
            root_pc,
            score: score * frequency,
            depth: depths.get(&root).copied().unwrap_or(0),
            imm_range,
            multiply,
            signature: signatures.remove(&root).unwrap_or_default(),
            export: Self::export_nodes(dag, root, &nodes),
            nodes,
        }
    }

    fn export_nodes(
        dag: &DependencyGraph,
        root: NodeId,
        nodes: &BTreeSet<NodeId>,
    ) -> SubgraphExport {
        let index: HashMap<NodeId, usize> =
            nodes.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let mut export =
            SubgraphExport { root: index[&root], nodes: Vec::new(), edges: Vec::new() };

        for &id in nodes {
            export.nodes.push(match dag.node(id) {
                Node::Register { register } => ExportNode::Register { name: register.to_string() },
                Node::Instruction(node) => ExportNode::Instruction {
                    mnemonic: node.instruction.mnemonic().to_string(),
                    label: node.label.clone(),
                },
            });
            export.edges.extend(dag.producers(id).iter().map(|p| (index[&id], index[p])));
        }
        for &id in nodes {
            let Some(node) = dag.instruction(id) else {
                continue;
            };
            for &value in node.instruction.immediates() {
                export.nodes.push(ExportNode::Constant { value });
                export.edges.push((index[&id], export.nodes.len() - 1));
            }
        }
        export
    }

    /// Shape of the candidate: `mnemonic(operand shapes)` with operand shapes sorted
    /// and register inputs left out
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn export(&self) -> &SubgraphExport {
        &self.export
    }

    /// Whether any fused instruction multiplies
    pub fn contains_multiply(&self) -> bool {
        self.multiply
    }

    /// Number of instructions this candidate replaces
    pub fn instruction_count(&self) -> usize {
        self.export
            .nodes
            .iter()
            .filter(|node| matches!(node, ExportNode::Instruction { .. }))
            .count()
    }
}

/// Finds the dependency closures that can be fused into one instruction
pub struct CandidateSelector<'a> {
    liveness: &'a Liveness,
    max_inputs: usize,
}

impl<'a> CandidateSelector<'a> {
    pub fn new(liveness: &'a Liveness, max_inputs: usize) -> Self {
        Self { liveness, max_inputs }
    }

    /// Whether the closure of `root` makes a valid fused instruction
    ///
    /// The closure may read at most `max_inputs` registers, counting the pc read by an
    /// `auipc` as one. It must fuse at least two instructions. Values computed inside
    /// it may not be read by anything outside it, neither later in the sub-block (the
    /// closing branch included) nor in a successor, unless the root writes the same
    /// register.
    pub fn is_candidate(
        &self,
        dag: &DependencyGraph,
        root: NodeId,
        closure: &BTreeSet<NodeId>,
    ) -> bool {
        let Some(root_node) = dag.instruction(root) else {
            return false;
        };
        let leaves = closure.iter().filter(|&&id| dag.node(id).is_register()).count();
        let pc_reads = closure
            .iter()
            .filter_map(|&id| dag.instruction(id))
            .filter(|node| node.instruction.reads_pc())
            .count();
        if leaves + pc_reads > self.max_inputs {
            return false;
        }

        let inner: Vec<NodeId> = closure
            .iter()
            .copied()
            .filter(|&id| id != root && !dag.node(id).is_register())
            .collect();
        if inner.is_empty() {
            return false;
        }
        if inner.iter().any(|&id| {
            dag.is_read_outside(id) || dag.consumers(id).iter().any(|c| !closure.contains(c))
        }) {
            return false;
        }

        let root_writes = root_node.instruction.dest_registers();
        !inner.iter().filter_map(|&id| dag.instruction(id)).any(|node| {
            node.instruction
                .dest_registers()
                .iter()
                .filter(|r| !r.is_zero() && !root_writes.contains(r))
                .any(|&r| self.liveness.needs_to_stay_live(dag.sub_block(), r))
        })
    }

    /// Every feasible candidate rooted in `dag`, in root order
    pub fn candidates(&self, dag: &DependencyGraph, sub_block: &SubBlock) -> Vec<Subgraph> {
        dag.nodes()
            .filter_map(|(root, node)| {
                let node = node.as_instruction()?;
                let closure = dag.closure(root);
                self.is_candidate(dag, root, &closure)
                    .then(|| Subgraph::new(dag, root, closure, node.pc, sub_block.frequency))
            })
            .collect()
    }

    /// Greedily keep the best candidates whose nodes are disjoint
    ///
    /// Candidates are taken by descending score, ties broken by root address. Shared
    /// register inputs count as overlap.
    pub fn select_non_overlapping(mut candidates: Vec<Subgraph>) -> Vec<Subgraph> {
        candidates.sort_by(|a, b| b.score.cmp(&a.score).then(a.root_pc.cmp(&b.root_pc)));
        let total = candidates.len();

        let mut taken: HashSet<(SubBlockId, NodeId)> = HashSet::new();
        let accepted: Vec<Subgraph> = candidates
            .into_iter()
            .filter(|candidate| {
                let key = |id: &NodeId| (candidate.sub_block, *id);
                let overlaps = candidate.nodes.iter().any(|id| taken.contains(&key(id)));
                if !overlaps {
                    taken.extend(candidate.nodes.iter().map(key));
                }
                !overlaps
            })
            .collect();
        debug!("Accepted {} of {} fusion candidates", accepted.len(), total);
        accepted
    }
}

#[cfg(test)]
mod tests {
    use riscv_decode::Isa;

    use super::*;
    use crate::{graph::SubBlockGraph, liveness::LivenessAnalyzer, program::Program};

    /// Candidates of every sub-block of a straight-line program starting at pc 0
    fn candidates(words: &[&str]) -> Vec<Subgraph> {
        let mut program = Program::new(Isa::rv32imc());
        let mut pc = 0;
        for word in words {
            program.add_instruction(pc, word, 10).unwrap();
            pc += program.instruction(pc).unwrap().size().bytes();
        }
        let blocks = program.basic_blocks();
        let sub_blocks = program.sub_blocks(&blocks);
        let graph = SubBlockGraph::build(&program, &sub_blocks);
        let liveness = LivenessAnalyzer::new(&program, &sub_blocks, &graph).run();
        let selector = CandidateSelector::new(&liveness, 2);
        sub_blocks
            .iter()
            .flat_map(|sub_block| {
                selector.candidates(&DependencyGraph::build(&program, sub_block), sub_block)
            })
            .collect()
    }

    #[test]
    fn test_two_instruction_chain() {
        // add a5,a4,a3 ; slli a5,a5,2 ; ret
        let found = candidates(&["00d707b3", "00279793", "00008067"]);
        assert_eq!(found.len(), 1);
        let candidate = &found[0];
        assert_eq!(candidate.root_pc, 4);
        assert_eq!(candidate.signature(), "slli(add)");
        assert_eq!(candidate.score, 10);
        assert_eq!(candidate.depth, 2);
        assert_eq!(candidate.imm_range, Some((2, 2)));
        assert!(!candidate.contains_multiply());
        assert_eq!(candidate.instruction_count(), 2);

        let export = candidate.export();
        // a4, a3, add, slli, then the shift amount
        assert_eq!(export.root, 3);
        assert_eq!(export.nodes[0], ExportNode::Register { name: "x14".to_string() });
        assert_eq!(export.nodes[4], ExportNode::Constant { value: 2 });
        assert_eq!(export.edges, vec![(2, 0), (2, 1), (3, 2), (3, 4)]);
    }

    #[test]
    fn test_too_many_inputs() {
        // add a5,a4,a3 ; add a5,a5,a2 ; ret
        assert!(candidates(&["00d707b3", "00c787b3", "00008067"]).is_empty());
    }

    #[test]
    fn test_intermediate_read_outside() {
        // addi a5,a4,1 ; slli a6,a5,2 ; sub a1,a5,a4 ; ret
        assert!(candidates(&["00170793", "00279813", "40e785b3", "00008067"]).is_empty());
    }

    #[test]
    fn test_intermediate_read_by_branch() {
        // addi a5,a4,1 ; slli a6,a5,2 ; beq a5,a0,+8 ; addi a0,a0,1 ; ret
        assert!(candidates(&["00170793", "00279813", "00a78463", "00150513", "00008067"])
            .is_empty());
        // addi a5,a4,1 ; slli a6,a5,2 ; beq a6,a0,+8 ; addi a0,a0,1 ; ret
        let found = candidates(&["00170793", "00279813", "00a80463", "00150513", "00008067"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].signature(), "slli(addi)");
    }

    #[test]
    fn test_intermediate_live_into_successor() {
        // addi a5,a4,1 ; slli a0,a5,2 | lw a1,0(a5) ; ret
        assert!(candidates(&["00170793", "00279513", "0007a583", "00008067"]).is_empty());
        // addi a5,a4,1 ; slli a0,a5,2 | lw a1,0(a0) ; ret
        let found = candidates(&["00170793", "00279513", "00052583", "00008067"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].signature(), "slli(addi)");
    }

    #[test]
    fn test_moves_do_not_add_depth() {
        // mv a5,a4 ; slli a5,a5,2 ; ret
        let found = candidates(&["00070793", "00279793", "00008067"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].depth, 1);
        assert_eq!(found[0].imm_range, Some((0, 2)));
    }

    #[test]
    fn test_selection_prefers_larger_closure() {
        // addi a5,a4,1 ; slli a5,a5,2 ; addi a5,a5,3 ; ret
        let found = candidates(&["00170793", "00279793", "00378793", "00008067"]);
        assert_eq!(found.len(), 2);

        let accepted = CandidateSelector::select_non_overlapping(found);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].signature(), "addi(slli(addi))");
        assert_eq!(accepted[0].score, 20);
        assert_eq!(accepted[0].depth, 3);
    }

    #[test]
    fn test_multiply_detection() {
        // addi a5,a4,1 ; mul a5,a5,a4 ; ret
        let found = candidates(&["00170793", "02e787b3", "00008067"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].signature(), "mul(addi)");
        assert!(found[0].contains_multiply());
    }
}
