use super::catalogue::standard_definition;
use super::definition::{GraphDefinition, IdRange, PivotRule};
use super::domain::{BranchKey, Question, QuestionId, QuestionKind, QuestionnaireError, ResponseValue};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Immutable catalogue of questions together with the per-branch ordering and
/// expected-count tables derived from it.
#[derive(Debug)]
pub struct QuestionGraph {
    questions: BTreeMap<QuestionId, Question>,
    pivot: QuestionId,
    pivot_rules: Vec<PivotRule>,
    branches: Vec<BranchKey>,
    orders: BTreeMap<BranchKey, Vec<QuestionId>>,
    expected_counts: BTreeMap<BranchKey, usize>,
    sentinel: QuestionId,
}

impl QuestionGraph {
    pub fn standard() -> Self {
        Self::assemble(standard_definition())
    }

    pub fn from_definition(definition: GraphDefinition) -> Result<Self, GraphError> {
        validate(&definition)?;
        Ok(Self::assemble(definition))
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, GraphError> {
        let definition: GraphDefinition =
            serde_json::from_reader(reader).map_err(GraphError::Parse)?;
        Self::from_definition(definition)
    }

    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let file = File::open(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_reader(BufReader::new(file))
    }

    fn assemble(definition: GraphDefinition) -> Self {
        let GraphDefinition {
            questions,
            primary,
            pivot_rules,
            branches,
            completion_sentinel,
        } = definition;

        let pivot = primary.sequence.last().copied().unwrap_or_default();

        let mut keys = Vec::with_capacity(branches.len());
        let mut orders = BTreeMap::new();
        let mut expected_counts = BTreeMap::new();
        for branch in branches {
            let order: Vec<QuestionId> = primary
                .sequence
                .iter()
                .chain(branch.segment.sequence.iter())
                .copied()
                .collect();
            expected_counts.insert(branch.key.clone(), order.len());
            orders.insert(branch.key.clone(), order);
            keys.push(branch.key);
        }

        let largest = expected_counts
            .values()
            .copied()
            .max()
            .unwrap_or(primary.sequence.len());
        expected_counts.insert(BranchKey::UNDETERMINED, largest + 1);
        orders.insert(BranchKey::UNDETERMINED, primary.sequence);

        Self {
            questions: questions
                .into_iter()
                .map(|question| (question.id, question))
                .collect(),
            pivot,
            pivot_rules,
            branches: keys,
            orders,
            expected_counts,
            sentinel: completion_sentinel,
        }
    }

    pub fn question_by_id(&self, id: QuestionId) -> Result<&Question, QuestionnaireError> {
        self.questions
            .get(&id)
            .ok_or(QuestionnaireError::NotFound(id))
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }

    pub fn pivot_question_id(&self) -> QuestionId {
        self.pivot
    }

    pub fn first_question_id(&self) -> QuestionId {
        self.sequence_for(&BranchKey::UNDETERMINED)
            .first()
            .copied()
            .unwrap_or(self.pivot)
    }

    pub fn completion_sentinel(&self) -> QuestionId {
        self.sentinel
    }

    /// Maps the pivot answer onto its branch. Values outside the pivot's declared
    /// options are an integration fault and are logged before being returned.
    pub fn branch_for(&self, response: &ResponseValue) -> Result<BranchKey, QuestionnaireError> {
        let branch = match response {
            ResponseValue::Choice(value) => self
                .pivot_rules
                .iter()
                .find(|rule| &rule.value == value)
                .map(|rule| rule.branch.clone()),
            _ => None,
        };

        branch.ok_or_else(|| {
            warn!(
                pivot = %self.pivot,
                value = %response,
                "pivot answer does not match any declared branch"
            );
            QuestionnaireError::UnknownBranchValue {
                question: self.pivot,
                value: response.to_string(),
            }
        })
    }

    /// Ordered ids a user walks through on `branch`, sentinel excluded.
    pub fn sequence_for(&self, branch: &BranchKey) -> &[QuestionId] {
        self.orders
            .get(branch)
            .or_else(|| self.orders.get(&BranchKey::UNDETERMINED))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn expected_count_for(&self, branch: &BranchKey) -> usize {
        self.expected_counts
            .get(branch)
            .or_else(|| self.expected_counts.get(&BranchKey::UNDETERMINED))
            .copied()
            .unwrap_or(1)
    }

    /// Concrete branches defined by this graph, in declaration order.
    pub fn branches(&self) -> impl Iterator<Item = &BranchKey> {
        self.branches.iter()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("unable to read questionnaire graph {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("questionnaire graph is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("primary sequence must contain at least the pivot question")]
    EmptyPrimary,
    #[error("question {0} is defined more than once")]
    DuplicateQuestion(QuestionId),
    #[error("branch key '{0}' is reserved or empty")]
    InvalidBranchKey(BranchKey),
    #[error("branch {0} is defined more than once")]
    DuplicateBranch(BranchKey),
    #[error("range {range} of {segment} is empty")]
    InvalidRange { segment: String, range: IdRange },
    #[error("range of {first} overlaps range of {second}")]
    OverlappingRanges { first: String, second: String },
    #[error("question {id} lies outside range {range} of {segment}")]
    OutOfRange {
        id: QuestionId,
        segment: String,
        range: IdRange,
    },
    #[error("question {0} is sequenced but never defined")]
    UndefinedQuestion(QuestionId),
    #[error("question {0} appears in more than one position")]
    RepeatedInSequence(QuestionId),
    #[error("branch {0} has no questions")]
    EmptyBranch(BranchKey),
    #[error("branch {0} is not selected by any pivot rule")]
    UnreachableBranch(BranchKey),
    #[error("question {question} cannot be answered: {reason}")]
    UnanswerableQuestion { question: QuestionId, reason: String },
    #[error("invalid pivot question {question}: {reason}")]
    InvalidPivot { question: QuestionId, reason: String },
    #[error("pivot option '{0}' is not mapped to a branch")]
    UnmappedPivotOption(String),
    #[error("pivot option '{0}' is mapped more than once")]
    DuplicatePivotRule(String),
    #[error("invalid completion sentinel {question}: {reason}")]
    InvalidSentinel { question: QuestionId, reason: String },
}

fn validate(definition: &GraphDefinition) -> Result<(), GraphError> {
    let mut questions = BTreeMap::new();
    for question in &definition.questions {
        if questions.insert(question.id, question).is_some() {
            return Err(GraphError::DuplicateQuestion(question.id));
        }
    }

    let pivot = *definition
        .primary
        .sequence
        .last()
        .ok_or(GraphError::EmptyPrimary)?;

    let mut segments = vec![("primary".to_string(), &definition.primary)];
    let mut seen_branches = BTreeSet::new();
    for branch in &definition.branches {
        if !branch.key.is_determined() || branch.key.as_str().trim().is_empty() {
            return Err(GraphError::InvalidBranchKey(branch.key.clone()));
        }
        if !seen_branches.insert(&branch.key) {
            return Err(GraphError::DuplicateBranch(branch.key.clone()));
        }
        if branch.segment.sequence.is_empty() {
            return Err(GraphError::EmptyBranch(branch.key.clone()));
        }
        segments.push((format!("branch {}", branch.key), &branch.segment));
    }

    for (index, (name, segment)) in segments.iter().enumerate() {
        if segment.range.start > segment.range.end {
            return Err(GraphError::InvalidRange {
                segment: name.clone(),
                range: segment.range,
            });
        }
        for (other_name, other) in &segments[index + 1..] {
            if segment.range.overlaps(&other.range) {
                return Err(GraphError::OverlappingRanges {
                    first: name.clone(),
                    second: other_name.clone(),
                });
            }
        }
    }

    let mut sequenced = BTreeSet::new();
    for (name, segment) in &segments {
        for &id in &segment.sequence {
            if !segment.range.contains(id) {
                return Err(GraphError::OutOfRange {
                    id,
                    segment: name.clone(),
                    range: segment.range,
                });
            }
            let question = questions
                .get(&id)
                .ok_or(GraphError::UndefinedQuestion(id))?;
            check_answerable(question)?;
            if !sequenced.insert(id) {
                return Err(GraphError::RepeatedInSequence(id));
            }
        }
    }

    let sentinel = definition.completion_sentinel;
    match questions.get(&sentinel) {
        None => {
            return Err(GraphError::InvalidSentinel {
                question: sentinel,
                reason: "not defined".to_string(),
            })
        }
        Some(question) if question.kind != QuestionKind::Review => {
            return Err(GraphError::InvalidSentinel {
                question: sentinel,
                reason: "must be a review step".to_string(),
            })
        }
        Some(_) if sequenced.contains(&sentinel) => {
            return Err(GraphError::InvalidSentinel {
                question: sentinel,
                reason: "must not appear in any sequence".to_string(),
            })
        }
        Some(_) => {}
    }

    let pivot_question = questions
        .get(&pivot)
        .ok_or(GraphError::UndefinedQuestion(pivot))?;
    if pivot_question.kind != QuestionKind::SingleChoice || pivot_question.options.is_empty() {
        return Err(GraphError::InvalidPivot {
            question: pivot,
            reason: "must be a single-choice question with options".to_string(),
        });
    }

    let mut seen_values = BTreeSet::new();
    let mut reachable = BTreeSet::new();
    for rule in &definition.pivot_rules {
        if !seen_values.insert(rule.value.as_str()) {
            return Err(GraphError::DuplicatePivotRule(rule.value.clone()));
        }
        if !pivot_question.declares_option(&rule.value) {
            return Err(GraphError::InvalidPivot {
                question: pivot,
                reason: format!("rule value '{}' is not a declared option", rule.value),
            });
        }
        if !seen_branches.contains(&rule.branch) {
            return Err(GraphError::EmptyBranch(rule.branch.clone()));
        }
        reachable.insert(&rule.branch);
    }

    if let Some(unreachable) = seen_branches.difference(&reachable).next() {
        return Err(GraphError::UnreachableBranch((*unreachable).clone()));
    }

    for option in &pivot_question.options {
        let mapped = definition
            .pivot_rules
            .iter()
            .any(|rule| rule.value == option.value);
        if !mapped {
            return Err(GraphError::UnmappedPivotOption(option.value.clone()));
        }
    }

    Ok(())
}

/// A sequenced question must admit at least one response, otherwise a session
/// reaching it can neither answer nor advance.
fn check_answerable(question: &Question) -> Result<(), GraphError> {
    let reason = match question.kind {
        QuestionKind::Review => "review steps may only be the completion sentinel",
        QuestionKind::SingleChoice | QuestionKind::MultiChoice if question.options.is_empty() => {
            "choice question declares no options"
        }
        _ => return Ok(()),
    };
    Err(GraphError::UnanswerableQuestion {
        question: question.id,
        reason: reason.to_string(),
    })
}
