//! Aggregated savings per candidate shape
use indexmap::IndexMap;
use serde::Serialize;

use crate::candidate::{Subgraph, SubgraphExport};

/// Every accepted occurrence of one candidate shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub signature: String,
    /// Summed score of all occurrences
    pub score: u64,
    pub occurrences: usize,
    /// Depth of the first occurrence
    pub depth: usize,
    pub imm_range: Option<(i32, i32)>,
    pub multiply: bool,
    /// Graph of the first occurrence
    pub graph: SubgraphExport,
}

fn union(a: Option<(i32, i32)>, b: Option<(i32, i32)>) -> Option<(i32, i32)> {
    match (a, b) {
        (Some((a_min, a_max)), Some((b_min, b_max))) => {
            Some((a_min.min(b_min), a_max.max(b_max)))
        }
        (range, None) | (None, range) => range,
    }
}

/// New instructions proposed for one program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Report {
    /// Keyed by signature, in order of first acceptance
    pub shapes: IndexMap<String, Shape>,
    pub saved_cycles: u64,
    pub total_cycles: u64,
    /// Deepest shape without a multiply
    pub max_depth: usize,
    /// Deepest shape with a multiply
    pub max_multiply_depth: usize,
}

impl Report {
    pub fn aggregate(accepted: &[Subgraph], total_cycles: u64) -> Self {
        let mut report = Self { total_cycles, ..Default::default() };

        for candidate in accepted {
            report.saved_cycles += candidate.score;
            report
                .shapes
                .entry(candidate.signature().to_string())
                .and_modify(|shape| {
                    shape.score += candidate.score;
                    shape.occurrences += 1;
                    shape.imm_range = union(shape.imm_range, candidate.imm_range);
                })
                .or_insert_with(|| Shape {
                    signature: candidate.signature().to_string(),
                    score: candidate.score,
                    occurrences: 1,
                    depth: candidate.depth,
                    imm_range: candidate.imm_range,
                    multiply: candidate.contains_multiply(),
                    graph: candidate.export().clone(),
                });
        }

        for shape in report.shapes.values() {
            let max =
                if shape.multiply { &mut report.max_multiply_depth } else { &mut report.max_depth };
            *max = (*max).max(shape.depth);
        }
        report
    }

    /// Number of distinct new instructions
    pub fn count(&self) -> usize {
        self.shapes.len()
    }

    /// Share of all executed cycles saved, in percent
    pub fn percent_saved(&self) -> f64 {
        if self.total_cycles == 0 {
            return 0.0;
        }
        self.saved_cycles as f64 / self.total_cycles as f64 * 100.0
    }

    /// Shapes by descending score
    pub fn ranked(&self) -> Vec<&Shape> {
        let mut shapes: Vec<&Shape> = self.shapes.values().collect();
        shapes.sort_by(|a, b| b.score.cmp(&a.score));
        shapes
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_of_ranges() {
        assert_eq!(union(Some((0, 4)), Some((-2, 3))), Some((-2, 4)));
        assert_eq!(union(None, Some((1, 1))), Some((1, 1)));
        assert_eq!(union(Some((1, 1)), None), Some((1, 1)));
        assert_eq!(union(None, None), None);
    }

    #[test]
    fn test_empty_report() {
        let report = Report::aggregate(&[], 0);
        assert_eq!(report.count(), 0);
        assert_eq!(report.percent_saved(), 0.0);
        assert!(report.to_json().unwrap().contains("\"saved_cycles\": 0"));
    }
}
