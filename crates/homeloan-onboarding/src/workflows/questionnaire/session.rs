use super::domain::{
    Advance, BranchKey, Question, QuestionId, QuestionnaireError, ResponseMap, ResponseValue,
    SessionState,
};
use super::graph::QuestionGraph;
use super::progress::ProgressCalculator;
use super::resolver::FlowResolver;
use super::snapshot::SessionSnapshot;
use super::visits::VisitTracker;
use std::sync::Arc;
use tracing::{debug, info};

/// One user's pass through the questionnaire. Owns the responses and visited set;
/// the graph is shared read-only between sessions.
#[derive(Debug, Clone)]
pub struct QuestionnaireSession {
    graph: Arc<QuestionGraph>,
    responses: ResponseMap,
    visits: VisitTracker,
    branch: BranchKey,
    state: SessionState,
}

impl QuestionnaireSession {
    /// Creates a session already started on the first question.
    pub fn new(graph: Arc<QuestionGraph>) -> Self {
        let first = graph.first_question_id();
        let mut session = Self {
            graph,
            responses: ResponseMap::new(),
            visits: VisitTracker::default(),
            branch: BranchKey::UNDETERMINED,
            state: SessionState::InProgress(first),
        };
        session.start();
        session
    }

    pub fn start(&mut self) -> QuestionId {
        let first = self.graph.first_question_id();
        self.responses.clear();
        self.visits.clear();
        self.visits.mark_visited(first);
        self.branch = BranchKey::UNDETERMINED;
        self.state = SessionState::InProgress(first);
        debug!(question = %first, "questionnaire session started");
        first
    }

    pub fn restart(&mut self) -> QuestionId {
        self.start()
    }

    pub fn answer(
        &mut self,
        id: QuestionId,
        value: ResponseValue,
    ) -> Result<(), QuestionnaireError> {
        let current = self.current()?;
        if id != current {
            return Err(QuestionnaireError::OutOfOrderAnswer {
                expected: current,
                received: id,
            });
        }

        let question = self.graph.question_by_id(id)?;
        let branch = if id == self.graph.pivot_question_id() {
            Some(self.graph.branch_for(&value)?)
        } else {
            None
        };
        question.accepts(&value)?;

        if let Some(branch) = branch {
            if branch != self.branch {
                debug!(from = %self.branch, to = %branch, "questionnaire branch resolved");
            }
            self.branch = branch;
        }
        debug!(question = %id, response = %value, "answer recorded");
        self.responses.insert(id, value);
        Ok(())
    }

    pub fn advance(&mut self) -> Result<Advance, QuestionnaireError> {
        let current = self.current()?;
        if !self.responses.contains_key(&current) {
            return Err(QuestionnaireError::MissingAnswer(current));
        }

        let resolver = FlowResolver::new(&self.graph);
        let branch = resolver.resolve_branch(&self.responses)?;
        let order = self.graph.sequence_for(&branch);
        let position = order
            .iter()
            .position(|id| *id == current)
            .ok_or(QuestionnaireError::NotFound(current))?;
        let next = order.get(position + 1).copied();

        self.branch = branch.clone();
        match next {
            Some(next) => {
                self.visits.mark_visited(next);
                self.state = SessionState::InProgress(next);
                debug!(from = %current, to = %next, "advanced to next question");
                Ok(Advance::Moved {
                    current_question_id: next,
                })
            }
            None => {
                let sentinel = self.graph.completion_sentinel();
                self.visits.mark_visited(sentinel);
                self.state = SessionState::Completed;
                info!(
                    branch = %branch,
                    answered = self.responses.len(),
                    "questionnaire completed"
                );
                Ok(Advance::Completed)
            }
        }
    }

    /// Steps back one question in the active branch order, forgetting everything
    /// visited after it. No-op on the first question.
    pub fn back(&mut self) -> Result<QuestionId, QuestionnaireError> {
        let current = self.current()?;
        let graph = Arc::clone(&self.graph);
        let order = FlowResolver::new(&graph).active_order(&self.responses)?;
        let position = order
            .iter()
            .position(|id| *id == current)
            .ok_or(QuestionnaireError::NotFound(current))?;

        if position == 0 {
            return Ok(current);
        }

        let previous = order[position - 1];
        let removed = self.visits.rewind_to(previous, order);
        for id in &removed {
            self.responses.remove(id);
        }
        if removed.contains(&graph.pivot_question_id()) {
            self.branch = BranchKey::UNDETERMINED;
        }
        self.state = SessionState::InProgress(previous);
        debug!(from = %current, to = %previous, purged = removed.len(), "rewound to previous question");
        Ok(previous)
    }

    pub fn progress_percent(&self) -> u8 {
        ProgressCalculator::new(&self.graph).percent_for_branch(&self.visits, &self.branch)
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// The question on screen; the review step once the session is complete.
    pub fn current_question(&self) -> Result<&Question, QuestionnaireError> {
        let id = match self.state {
            SessionState::InProgress(id) => id,
            SessionState::Completed => self.graph.completion_sentinel(),
        };
        self.graph.question_by_id(id)
    }

    pub fn current_question_id(&self) -> Option<QuestionId> {
        match self.state {
            SessionState::InProgress(id) => Some(id),
            SessionState::Completed => None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn branch(&self) -> &BranchKey {
        &self.branch
    }

    pub fn expected_count(&self) -> usize {
        self.graph.expected_count_for(&self.branch)
    }

    pub fn responses(&self) -> &ResponseMap {
        &self.responses
    }

    pub fn visited(&self) -> &VisitTracker {
        &self.visits
    }

    pub fn graph(&self) -> &QuestionGraph {
        &self.graph
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    fn current(&self) -> Result<QuestionId, QuestionnaireError> {
        self.current_question_id()
            .ok_or(QuestionnaireError::SessionAlreadyComplete)
    }
}
