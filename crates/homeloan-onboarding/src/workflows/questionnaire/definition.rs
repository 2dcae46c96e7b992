use super::domain::{BranchKey, Question, QuestionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive id range reserved for one segment of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    pub start: QuestionId,
    pub end: QuestionId,
}

impl IdRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self {
            start: QuestionId(start),
            end: QuestionId(end),
        }
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.start <= id && id <= self.end
    }

    pub fn overlaps(&self, other: &IdRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start.0, self.end.0)
    }
}

/// An ordered run of questions living inside a reserved id range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDefinition {
    pub range: IdRange,
    pub sequence: Vec<QuestionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchDefinition {
    pub key: BranchKey,
    #[serde(flatten)]
    pub segment: SegmentDefinition,
}

/// Maps one declared option of the pivot question onto a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotRule {
    pub value: String,
    pub branch: BranchKey,
}

/// Plain-data description of a questionnaire. The last id of the primary sequence is the
/// pivot question; each branch's sequence follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub questions: Vec<Question>,
    pub primary: SegmentDefinition,
    pub pivot_rules: Vec<PivotRule>,
    pub branches: Vec<BranchDefinition>,
    pub completion_sentinel: QuestionId,
}
