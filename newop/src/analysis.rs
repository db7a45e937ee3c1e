//! The whole pipeline, from decoded program to report
use std::io::BufRead;

use tracing::debug;

use crate::{
    candidate::{CandidateSelector, Subgraph},
    config::AnalysisConfig,
    graph::{DependencyGraph, SubBlockGraph},
    liveness::LivenessAnalyzer,
    program::Program,
    report::Report,
    Error,
};

/// Propose fused instructions for `program`
pub fn analyze(program: &Program, config: &AnalysisConfig) -> Report {
    let blocks = program.basic_blocks();
    let sub_blocks = program.sub_blocks(&blocks);
    let flow = SubBlockGraph::build(program, &sub_blocks);
    let liveness = LivenessAnalyzer::new(program, &sub_blocks, &flow).run();

    let selector = CandidateSelector::new(&liveness, config.max_inputs);
    let candidates: Vec<Subgraph> = sub_blocks
        .iter()
        .filter(|sub_block| !config.arithmetic_only || sub_block.is_arithmetic())
        .flat_map(|sub_block| {
            let dag = DependencyGraph::build(program, sub_block);
            selector.candidates(&dag, sub_block)
        })
        .collect();
    debug!("Found {} fusion candidates in {} sub-blocks", candidates.len(), sub_blocks.len());

    let accepted = CandidateSelector::select_non_overlapping(candidates);
    Report::aggregate(&accepted, program.total_cycles(&blocks))
}

/// Load a histogram with the configured ISA and analyze it
pub fn analyze_histogram<R: BufRead>(reader: R, config: &AnalysisConfig) -> Result<Report, Error> {
    let program = Program::from_histogram(reader, config.isa)?;
    Ok(analyze(&program, config))
}
