use super::domain::{BranchKey, Question, QuestionId, SessionState};
use super::session::QuestionnaireSession;
use serde::Serialize;

/// Serializable view of a session handed to the UI after every transition.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub state_label: String,
    pub current_question: Option<Question>,
    pub branch: BranchKey,
    pub branch_label: String,
    pub expected_count: usize,
    pub visited: Vec<QuestionId>,
    pub answered: usize,
    pub progress_percent: u8,
    pub completed: bool,
}

impl SessionSnapshot {
    pub(crate) fn capture(session: &QuestionnaireSession) -> Self {
        let state = session.state();
        let branch = session.branch().clone();

        Self {
            state,
            state_label: state.label().to_string(),
            current_question: session.current_question().ok().cloned(),
            branch_label: branch.label().to_string(),
            branch,
            expected_count: session.expected_count(),
            visited: session.visited().ids().collect(),
            answered: session.responses().len(),
            progress_percent: session.progress_percent(),
            completed: session.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::workflows::questionnaire::{QuestionGraph, QuestionnaireSession};
    use std::sync::Arc;

    #[test]
    fn snapshot_serializes_state_and_progress() {
        let session = QuestionnaireSession::new(Arc::new(QuestionGraph::standard()));
        let value = serde_json::to_value(session.snapshot()).expect("snapshot serializes");

        assert_eq!(value["state"]["status"], "in_progress");
        assert_eq!(value["state"]["current_question"], 1);
        assert_eq!(value["branch"], "undetermined");
        assert_eq!(value["expected_count"], 12);
        assert_eq!(value["progress_percent"], 8);
        assert_eq!(value["current_question"]["kind"], "text");
        assert_eq!(value["completed"], false);
    }
}
