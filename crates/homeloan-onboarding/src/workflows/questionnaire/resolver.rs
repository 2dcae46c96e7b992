use super::domain::{BranchKey, QuestionId, QuestionnaireError, ResponseMap};
use super::graph::QuestionGraph;

/// Derives the active branch and its expected question count from a response snapshot.
#[derive(Debug, Clone, Copy)]
pub struct FlowResolver<'g> {
    graph: &'g QuestionGraph,
}

impl<'g> FlowResolver<'g> {
    pub fn new(graph: &'g QuestionGraph) -> Self {
        Self { graph }
    }

    pub fn resolve_branch(&self, responses: &ResponseMap) -> Result<BranchKey, QuestionnaireError> {
        match responses.get(&self.graph.pivot_question_id()) {
            Some(response) => self.graph.branch_for(response),
            None => Ok(BranchKey::UNDETERMINED),
        }
    }

    pub fn expected_count(&self, responses: &ResponseMap) -> Result<usize, QuestionnaireError> {
        let branch = self.resolve_branch(responses)?;
        Ok(self.graph.expected_count_for(&branch))
    }

    pub fn active_order(&self, responses: &ResponseMap) -> Result<&'g [QuestionId], QuestionnaireError> {
        let branch = self.resolve_branch(responses)?;
        Ok(self.graph.sequence_for(&branch))
    }
}
