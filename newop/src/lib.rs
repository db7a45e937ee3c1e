//! Proposes new fused RISC-V instructions from an execution histogram
//!
//! A profiled program is split into basic blocks and then into sub-blocks that
//! never mix arithmetic with memory accesses. Inside each sub-block the data
//! dependencies form a DAG and every dependency closure that reads few enough
//! registers, and whose intermediate values die inside it, is a candidate for one
//! new instruction. Candidates are scored by the cycles they would save and the
//! best disjoint ones are grouped by shape.
pub mod analysis;
pub mod block;
pub mod candidate;
pub mod config;
pub mod graph;
pub mod histogram;
pub mod liveness;
pub mod program;
pub mod report;

pub use analysis::{analyze, analyze_histogram};
pub use block::{BasicBlock, SubBlock, SubBlockId};
pub use candidate::{CandidateSelector, ExportNode, Subgraph, SubgraphExport};
pub use config::AnalysisConfig;
pub use graph::{DependencyGraph, SubBlockGraph};
pub use histogram::Record;
pub use liveness::{Liveness, LivenessAnalyzer};
pub use program::Program;
pub use report::{Report, Shape};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] riscv_decode::Error),
    #[error("ISA error: {0}")]
    Isa(#[from] riscv_decode::IsaError),
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}
