use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Answers captured during one session, keyed by question.
pub type ResponseMap = BTreeMap<QuestionId, ResponseValue>;

/// Identifier of a question within a questionnaire graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultiChoice,
    Text,
    Date,
    Amount,
    Review,
}

impl QuestionKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SingleChoice => "Single Choice",
            Self::MultiChoice => "Multiple Choice",
            Self::Text => "Free Text",
            Self::Date => "Date",
            Self::Amount => "Amount",
            Self::Review => "Review",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub value: String,
    pub label: String,
}

impl AnswerOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn declares_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }

    /// Checks that `response` fits this question's kind and declared options.
    pub fn accepts(&self, response: &ResponseValue) -> Result<(), QuestionnaireError> {
        let invalid = |reason: String| QuestionnaireError::InvalidResponse {
            question: self.id,
            reason,
        };

        match (self.kind, response) {
            (QuestionKind::SingleChoice, ResponseValue::Choice(value)) => {
                if self.declares_option(value) {
                    Ok(())
                } else {
                    Err(invalid(format!("'{value}' is not a declared option")))
                }
            }
            (QuestionKind::MultiChoice, ResponseValue::Choices(values)) => {
                if values.is_empty() {
                    return Err(invalid("at least one option must be selected".to_string()));
                }
                match values.iter().find(|value| !self.declares_option(value)) {
                    Some(value) => Err(invalid(format!("'{value}' is not a declared option"))),
                    None => Ok(()),
                }
            }
            (QuestionKind::Text, ResponseValue::Text(text)) => {
                if text.trim().is_empty() {
                    Err(invalid("text must not be blank".to_string()))
                } else {
                    Ok(())
                }
            }
            (QuestionKind::Date, ResponseValue::Date(_))
            | (QuestionKind::Amount, ResponseValue::Amount(_)) => Ok(()),
            (QuestionKind::Review, _) => Err(invalid("review steps take no answer".to_string())),
            (kind, other) => Err(invalid(format!(
                "{} response does not fit a {} question",
                other.kind_label(),
                kind.label()
            ))),
        }
    }
}

/// Value captured for a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ResponseValue {
    Choice(String),
    Choices(Vec<String>),
    Text(String),
    Date(NaiveDate),
    Amount(u64),
}

impl ResponseValue {
    pub fn choice(value: impl Into<String>) -> Self {
        Self::Choice(value.into())
    }

    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Choice(_) => "choice",
            Self::Choices(_) => "choices",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::Amount(_) => "amount",
        }
    }
}

impl fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Choice(value) | Self::Text(value) => f.write_str(value),
            Self::Choices(values) => f.write_str(&values.join(", ")),
            Self::Date(date) => write!(f, "{date}"),
            Self::Amount(amount) => write!(f, "{amount}"),
        }
    }
}

/// Flow selected by the pivot answer. Keys are plain strings so loaded graphs can
/// declare their own branches; `undetermined` is reserved for the unresolved state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchKey(Cow<'static, str>);

impl BranchKey {
    pub const UNDETERMINED: Self = Self(Cow::Borrowed("undetermined"));
    pub const SOLO: Self = Self(Cow::Borrowed("solo"));
    pub const CO_APPLICANT: Self = Self(Cow::Borrowed("co_applicant"));
    pub const GUARANTOR: Self = Self(Cow::Borrowed("guarantor"));

    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn label(&self) -> &str {
        match self.as_str() {
            "undetermined" => "Undetermined",
            "solo" => "Solo Applicant",
            "co_applicant" => "Co-Applicant",
            "guarantor" => "Guarantor Backed",
            other => other,
        }
    }

    pub fn is_determined(&self) -> bool {
        *self != Self::UNDETERMINED
    }
}

impl Default for BranchKey {
    fn default() -> Self {
        Self::UNDETERMINED
    }
}

impl fmt::Display for BranchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "current_question", rename_all = "snake_case")]
pub enum SessionState {
    InProgress(QuestionId),
    Completed,
}

impl SessionState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InProgress(_) => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

/// Result of a successful [`advance`](super::QuestionnaireSession::advance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advance {
    Moved { current_question_id: QuestionId },
    Completed,
}

/// Errors surfaced to the UI by the questionnaire engine. None of them leave the
/// session partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuestionnaireError {
    #[error("question {0} not found")]
    NotFound(QuestionId),
    #[error("'{value}' is not a declared option of pivot question {question}")]
    UnknownBranchValue { question: QuestionId, value: String },
    #[error("answer for {received} arrived while {expected} is current")]
    OutOfOrderAnswer {
        expected: QuestionId,
        received: QuestionId,
    },
    #[error("questionnaire session is already complete")]
    SessionAlreadyComplete,
    #[error("invalid response for {question}: {reason}")]
    InvalidResponse { question: QuestionId, reason: String },
    #[error("question {0} must be answered before advancing")]
    MissingAnswer(QuestionId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice_question() -> Question {
        Question {
            id: QuestionId(5),
            kind: QuestionKind::SingleChoice,
            prompt: "Who is applying?".to_string(),
            options: vec![
                AnswerOption::new("solo", "Just me"),
                AnswerOption::new("co-applicant", "Me and a partner"),
            ],
        }
    }

    #[test]
    fn single_choice_rejects_undeclared_values() {
        let question = choice_question();
        assert!(question.accepts(&ResponseValue::choice("solo")).is_ok());

        let err = question
            .accepts(&ResponseValue::choice("lodger"))
            .expect_err("lodger is not declared");
        assert!(matches!(
            err,
            QuestionnaireError::InvalidResponse { question, .. } if question == QuestionId(5)
        ));
    }

    #[test]
    fn mismatched_response_kind_is_rejected() {
        let question = choice_question();
        let err = question
            .accepts(&ResponseValue::Amount(250_000))
            .expect_err("amount does not fit a choice");
        assert!(err.to_string().contains("amount response"));
    }

    #[test]
    fn response_values_serialize_with_type_tag() {
        let value = serde_json::to_value(ResponseValue::choice("solo")).expect("serializes");
        assert_eq!(value, serde_json::json!({ "type": "choice", "value": "solo" }));

        let date: ResponseValue =
            serde_json::from_value(serde_json::json!({ "type": "date", "value": "1990-04-12" }))
                .expect("date parses");
        assert_eq!(
            date,
            ResponseValue::Date(NaiveDate::from_ymd_opt(1990, 4, 12).expect("valid date"))
        );
    }

    #[test]
    fn branch_keys_are_plain_strings() {
        let parsed: BranchKey =
            serde_json::from_value(serde_json::json!("co_applicant")).expect("key parses");
        assert_eq!(parsed, BranchKey::CO_APPLICANT);
        assert_eq!(parsed.label(), "Co-Applicant");

        let custom = BranchKey::new("refinance");
        assert!(custom.is_determined());
        assert_eq!(custom.label(), "refinance");
        assert_eq!(serde_json::to_value(&custom).expect("serializes"), "refinance");

        assert_eq!(BranchKey::default(), BranchKey::UNDETERMINED);
        assert!(!BranchKey::new("undetermined").is_determined());
    }
}
