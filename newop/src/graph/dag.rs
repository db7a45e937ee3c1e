use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;
use riscv_decode::{Instruction, Register};
use serde::Serialize;

use crate::{
    block::{SubBlock, SubBlockId},
    program::Program,
};

/// Index of a node inside one [`DependencyGraph`]
pub type NodeId = usize;

/// An instruction taking part in the data flow of a sub-block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionNode {
    pub pc: u32,
    /// `pc: disassembly`
    pub label: String,
    #[serde(skip)]
    pub instruction: Instruction,
    pub frequency: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Value live into the sub-block
    Register { register: Register },
    Instruction(InstructionNode),
}

impl Node {
    pub fn is_register(&self) -> bool {
        matches!(self, Node::Register { .. })
    }

    pub fn as_instruction(&self) -> Option<&InstructionNode> {
        match self {
            Node::Instruction(node) => Some(node),
            Node::Register { .. } => None,
        }
    }
}

/// Def-use graph of one sub-block
///
/// Edges run from a consumer to the producer of each of its source registers. A
/// register read before any write in the sub-block is produced by a register leaf.
/// Nodes are created in program order, so every producer has a smaller id than
/// its consumers.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    sub_block: SubBlockId,
    nodes: Vec<Node>,
    producers: Vec<Vec<NodeId>>,
    consumers: Vec<Vec<NodeId>>,
    /// Read by a control transfer or another instruction that is not a node
    read_outside: Vec<bool>,
}

impl DependencyGraph {
    fn empty(sub_block: SubBlockId) -> Self {
        Self {
            sub_block,
            nodes: Vec::new(),
            producers: Vec::new(),
            consumers: Vec::new(),
            read_outside: Vec::new(),
        }
    }

    fn add_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.producers.push(Vec::new());
        self.consumers.push(Vec::new());
        self.read_outside.push(false);
        self.nodes.len() - 1
    }

    fn add_edge(&mut self, consumer: NodeId, producer: NodeId) {
        if !self.producers[consumer].contains(&producer) {
            self.producers[consumer].push(producer);
            self.consumers[producer].push(consumer);
        }
    }

    /// Build the graph for `sub_block`
    ///
    /// Control transfers and instructions without a destination (other than `x0`)
    /// carry no value forward and never become nodes. The values they read are
    /// marked as read outside the graph. Reads of `x0` are constants and add no edge.
    pub fn build(program: &Program, sub_block: &SubBlock) -> Self {
        let mut graph = Self::empty(sub_block.id);
        let mut current: HashMap<Register, NodeId> = HashMap::new();

        for &pc in &sub_block.pcs {
            let Some(instruction) = program.instruction(pc) else {
                continue;
            };
            let dests: Vec<Register> =
                instruction.dest_registers().iter().copied().filter(|r| !r.is_zero()).collect();
            if instruction.is_control_transfer() || dests.is_empty() {
                for src in instruction.src_registers() {
                    if let Some(&producer) = current.get(src) {
                        graph.read_outside[producer] = true;
                    }
                }
                continue;
            }

            let producers: Vec<NodeId> = instruction
                .src_registers()
                .iter()
                .copied()
                .filter(|r| !r.is_zero())
                .unique()
                .map(|register| {
                    *current
                        .entry(register)
                        .or_insert_with(|| graph.add_node(Node::Register { register }))
                })
                .collect();

            let id = graph.add_node(Node::Instruction(InstructionNode {
                pc,
                label: format!("{pc:#x}: {instruction}"),
                instruction: instruction.clone(),
                frequency: sub_block.frequency,
            }));
            for producer in producers {
                graph.add_edge(id, producer);
            }
            for dest in dests {
                current.insert(dest, id);
            }
        }
        graph
    }

    pub fn sub_block(&self) -> SubBlockId {
        self.sub_block
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate()
    }

    pub fn instruction(&self, id: NodeId) -> Option<&InstructionNode> {
        self.nodes[id].as_instruction()
    }

    /// Nodes whose values `id` reads
    pub fn producers(&self, id: NodeId) -> &[NodeId] {
        &self.producers[id]
    }

    /// Nodes reading the value `id` writes
    pub fn consumers(&self, id: NodeId) -> &[NodeId] {
        &self.consumers[id]
    }

    /// Whether an instruction outside the graph reads the value `id` holds
    pub fn is_read_outside(&self, id: NodeId) -> bool {
        self.read_outside[id]
    }

    /// `root` and everything it transitively depends on
    pub fn closure(&self, root: NodeId) -> BTreeSet<NodeId> {
        let mut closure = BTreeSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if closure.insert(id) {
                stack.extend(self.producers(id));
            }
        }
        closure
    }
}

#[cfg(test)]
mod tests {
    use riscv_decode::Isa;

    use super::*;

    fn program(words: &[&str]) -> (Program, Vec<SubBlock>) {
        let mut program = Program::new(Isa::rv32imc());
        let mut pc = 0;
        for word in words {
            program.add_instruction(pc, word, 5).unwrap();
            pc += program.instruction(pc).unwrap().size().bytes();
        }
        let blocks = program.basic_blocks();
        let sub_blocks = program.sub_blocks(&blocks);
        (program, sub_blocks)
    }

    #[test]
    fn test_edges_follow_last_writer() {
        // add a5,a4,a3 ; slli a5,a5,2 ; add a0,a5,a4 ; ret
        let (program, sub_blocks) = program(&["00d707b3", "00279793", "00e78533", "00008067"]);
        let dag = DependencyGraph::build(&program, &sub_blocks[0]);

        // a4, a3, add, slli, add
        assert_eq!(dag.len(), 5);
        assert_eq!(dag.node(0), &Node::Register { register: Register::X(14) });
        assert_eq!(dag.producers(2), &[0, 1]);
        assert_eq!(dag.producers(3), &[2]);
        assert_eq!(dag.producers(4), &[3, 0]);
        assert_eq!(dag.consumers(0), &[2, 4]);
        assert_eq!(dag.instruction(3).unwrap().label, "0x4: slli a5,a5,2");
        assert_eq!(dag.instruction(3).unwrap().frequency, 5);
        assert_eq!(dag.closure(4).into_iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_branch_operands_are_read_outside() {
        // addi a5,a4,1 ; slli a6,a5,2 ; beq a5,a0,+8
        let (program, sub_blocks) = program(&["00170793", "00279813", "00a78463"]);
        let dag = DependencyGraph::build(&program, &sub_blocks[0]);

        // a4, addi, slli
        assert_eq!(dag.len(), 3);
        assert!(!dag.is_read_outside(0));
        assert!(dag.is_read_outside(1));
        assert!(!dag.is_read_outside(2));
    }

    #[test]
    fn test_zero_reads_and_repeated_sources() {
        // addi a0,zero,1 ; add a1,a0,a0 ; ret
        let (program, sub_blocks) = program(&["00100513", "00a505b3", "00008067"]);
        let dag = DependencyGraph::build(&program, &sub_blocks[0]);

        assert_eq!(dag.len(), 2);
        assert!(dag.producers(0).is_empty());
        assert_eq!(dag.producers(1), &[0]);
    }
}
