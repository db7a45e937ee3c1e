//! Graphs built over a program: per sub-block data dependencies and the sub-block
//! control flow between them
mod dag;
mod flow;

pub use dag::{DependencyGraph, InstructionNode, Node, NodeId};
pub use flow::SubBlockGraph;
