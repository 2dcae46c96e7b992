use super::domain::{BranchKey, QuestionnaireError, ResponseMap};
use super::graph::QuestionGraph;
use super::resolver::FlowResolver;
use super::visits::VisitTracker;

/// Highest percentage reported before the completion sentinel is reached.
pub const MAX_INCOMPLETE_PERCENT: u8 = 99;

#[derive(Debug, Clone, Copy)]
pub struct ProgressCalculator<'g> {
    graph: &'g QuestionGraph,
    resolver: FlowResolver<'g>,
}

impl<'g> ProgressCalculator<'g> {
    pub fn new(graph: &'g QuestionGraph) -> Self {
        Self {
            graph,
            resolver: FlowResolver::new(graph),
        }
    }

    pub fn percent(
        &self,
        visited: &VisitTracker,
        responses: &ResponseMap,
    ) -> Result<u8, QuestionnaireError> {
        if visited.contains(self.graph.completion_sentinel()) {
            return Ok(100);
        }

        let branch = self.resolver.resolve_branch(responses)?;
        Ok(self.percent_for_branch(visited, &branch))
    }

    pub fn percent_for_branch(&self, visited: &VisitTracker, branch: &BranchKey) -> u8 {
        if visited.contains(self.graph.completion_sentinel()) {
            return 100;
        }

        incomplete_percent(visited.size(), self.graph.expected_count_for(branch))
    }
}

/// `100 * visited / expected`, capped at 99 and rounded half-up.
pub fn incomplete_percent(visited: usize, expected: usize) -> u8 {
    let expected = expected.max(1) as u64;
    let visited = visited as u64;
    let rounded = (200 * visited + expected) / (2 * expected);
    rounded.min(MAX_INCOMPLETE_PERCENT as u64) as u8
}
