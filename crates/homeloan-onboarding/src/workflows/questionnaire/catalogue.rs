use super::definition::{BranchDefinition, GraphDefinition, IdRange, PivotRule, SegmentDefinition};
use super::domain::{AnswerOption, BranchKey, Question, QuestionId, QuestionKind};

pub const PIVOT_QUESTION: QuestionId = QuestionId(5);
pub const REVIEW_QUESTION: QuestionId = QuestionId(900);

/// The built-in home-loan onboarding questionnaire.
pub fn standard_definition() -> GraphDefinition {
    GraphDefinition {
        questions: standard_questions(),
        primary: SegmentDefinition {
            range: IdRange::new(1, 5),
            sequence: ids(1..=5),
        },
        pivot_rules: vec![
            PivotRule {
                value: "solo".to_string(),
                branch: BranchKey::SOLO,
            },
            PivotRule {
                value: "co-applicant".to_string(),
                branch: BranchKey::CO_APPLICANT,
            },
            PivotRule {
                value: "guarantor".to_string(),
                branch: BranchKey::GUARANTOR,
            },
        ],
        branches: vec![
            BranchDefinition {
                key: BranchKey::SOLO,
                segment: SegmentDefinition {
                    range: IdRange::new(6, 99),
                    sequence: ids(6..=10),
                },
            },
            BranchDefinition {
                key: BranchKey::CO_APPLICANT,
                segment: SegmentDefinition {
                    range: IdRange::new(100, 199),
                    sequence: ids(100..=105),
                },
            },
            BranchDefinition {
                key: BranchKey::GUARANTOR,
                segment: SegmentDefinition {
                    range: IdRange::new(200, 299),
                    sequence: ids(200..=203),
                },
            },
        ],
        completion_sentinel: REVIEW_QUESTION,
    }
}

fn ids(range: std::ops::RangeInclusive<u32>) -> Vec<QuestionId> {
    range.map(QuestionId).collect()
}

fn question(id: u32, kind: QuestionKind, prompt: &str) -> Question {
    Question {
        id: QuestionId(id),
        kind,
        prompt: prompt.to_string(),
        options: Vec::new(),
    }
}

fn choice(id: u32, kind: QuestionKind, prompt: &str, options: &[(&str, &str)]) -> Question {
    Question {
        options: options
            .iter()
            .map(|(value, label)| AnswerOption::new(*value, *label))
            .collect(),
        ..question(id, kind, prompt)
    }
}

fn standard_questions() -> Vec<Question> {
    use QuestionKind::*;

    vec![
        question(1, Text, "What is your full legal name?"),
        question(2, Date, "What is your date of birth?"),
        choice(
            3,
            SingleChoice,
            "Which best describes your employment?",
            &[
                ("employed", "Employed"),
                ("self-employed", "Self-employed"),
                ("retired", "Retired"),
                ("other", "Something else"),
            ],
        ),
        question(4, Amount, "Roughly what price is the property you want to buy?"),
        choice(
            5,
            SingleChoice,
            "Who will be named on the mortgage?",
            &[
                ("solo", "Just me"),
                ("co-applicant", "Me and a co-applicant"),
                ("guarantor", "Me, supported by a guarantor"),
            ],
        ),
        // solo
        question(6, Amount, "What is your annual income before tax?"),
        question(7, Amount, "How much deposit have you saved?"),
        choice(
            8,
            MultiChoice,
            "Which regular commitments do you pay each month?",
            &[
                ("credit-cards", "Credit cards"),
                ("car-finance", "Car finance"),
                ("student-loan", "Student loan"),
                ("childcare", "Childcare"),
                ("none", "None of these"),
            ],
        ),
        choice(
            9,
            SingleChoice,
            "How would you like to repay the loan?",
            &[
                ("repayment", "Capital and interest"),
                ("interest-only", "Interest only"),
            ],
        ),
        choice(
            10,
            SingleChoice,
            "What mortgage term would you prefer?",
            &[("15", "15 years"), ("25", "25 years"), ("35", "35 years")],
        ),
        // co-applicant
        question(100, Text, "What is your co-applicant's full legal name?"),
        question(101, Date, "What is your co-applicant's date of birth?"),
        choice(
            102,
            SingleChoice,
            "How are you related to your co-applicant?",
            &[
                ("spouse", "Spouse or civil partner"),
                ("partner", "Partner"),
                ("family", "Family member"),
                ("friend", "Friend"),
            ],
        ),
        question(103, Amount, "What is your combined annual income before tax?"),
        question(104, Amount, "How much deposit have you saved together?"),
        choice(
            105,
            SingleChoice,
            "How would you like to repay the loan?",
            &[
                ("repayment", "Capital and interest"),
                ("interest-only", "Interest only"),
            ],
        ),
        // guarantor
        question(200, Text, "What is your guarantor's full legal name?"),
        choice(
            201,
            SingleChoice,
            "How is your guarantor related to you?",
            &[("parent", "Parent"), ("grandparent", "Grandparent"), ("other", "Other family")],
        ),
        question(202, Amount, "What is your guarantor's annual income before tax?"),
        choice(
            203,
            SingleChoice,
            "Does your guarantor own their home outright?",
            &[("yes", "Yes"), ("no", "No")],
        ),
        question(900, Review, "Review your answers before we send them to an adviser."),
    ]
}
