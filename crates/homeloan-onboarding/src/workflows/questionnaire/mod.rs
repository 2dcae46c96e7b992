//! Adaptive onboarding questionnaire: a branching question graph, the session state
//! machine that walks it, and the progress figure shown to the applicant.

pub mod catalogue;
pub mod definition;
pub mod domain;
mod graph;
mod progress;
mod resolver;
mod session;
mod snapshot;
mod visits;

pub use domain::{
    Advance, AnswerOption, BranchKey, Question, QuestionId, QuestionKind, QuestionnaireError,
    ResponseMap, ResponseValue, SessionState,
};
pub use graph::{GraphError, QuestionGraph};
pub use progress::{incomplete_percent, ProgressCalculator, MAX_INCOMPLETE_PERCENT};
pub use resolver::FlowResolver;
pub use session::QuestionnaireSession;
pub use snapshot::SessionSnapshot;
pub use visits::VisitTracker;
