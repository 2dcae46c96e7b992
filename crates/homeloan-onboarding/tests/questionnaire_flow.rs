use chrono::NaiveDate;
use homeloan_onboarding::workflows::questionnaire::{
    Advance, BranchKey, FlowResolver, Question, QuestionGraph, QuestionId, QuestionKind,
    QuestionnaireError, QuestionnaireSession, ResponseValue,
};
use std::sync::Arc;

fn new_session() -> QuestionnaireSession {
    QuestionnaireSession::new(Arc::new(QuestionGraph::standard()))
}

fn sample_response(question: &Question, pivot_value: &str) -> ResponseValue {
    match question.kind {
        QuestionKind::SingleChoice if question.id == QuestionId(5) => {
            ResponseValue::choice(pivot_value)
        }
        QuestionKind::SingleChoice => ResponseValue::choice(question.options[0].value.clone()),
        QuestionKind::MultiChoice => ResponseValue::Choices(vec![question.options[0].value.clone()]),
        QuestionKind::Text => ResponseValue::Text("Ada Byron".to_string()),
        QuestionKind::Date => {
            ResponseValue::Date(NaiveDate::from_ymd_opt(1988, 6, 1).expect("valid date"))
        }
        QuestionKind::Amount => ResponseValue::Amount(285_000),
        QuestionKind::Review => panic!("review steps are never answered"),
    }
}

/// Answers the current question and advances, returning the advance outcome.
fn answer_and_advance(session: &mut QuestionnaireSession, pivot_value: &str) -> Advance {
    let question = session.current_question().expect("current question").clone();
    session
        .answer(question.id, sample_response(&question, pivot_value))
        .expect("answer accepted");
    session.advance().expect("advance succeeds")
}

fn visited_ids(session: &QuestionnaireSession) -> Vec<u32> {
    session.visited().ids().map(|id| id.0).collect()
}

#[test]
fn solo_walk_climbs_to_99_then_completes_at_100() {
    let mut session = new_session();
    let mut progress = vec![session.progress_percent()];
    let mut current = vec![session.current_question_id().expect("in progress").0];

    for _ in 0..9 {
        match answer_and_advance(&mut session, "solo") {
            Advance::Moved {
                current_question_id,
            } => current.push(current_question_id.0),
            Advance::Completed => panic!("completed too early"),
        }
        progress.push(session.progress_percent());
    }

    assert_eq!(current, (1..=10).collect::<Vec<u32>>());
    assert!(
        progress.windows(2).all(|pair| pair[0] < pair[1]),
        "progress should strictly increase: {progress:?}"
    );
    assert_eq!(progress.last(), Some(&99));
    assert_eq!(session.expected_count(), 10);

    assert_eq!(answer_and_advance(&mut session, "solo"), Advance::Completed);
    assert!(session.is_complete());
    assert_eq!(session.progress_percent(), 100);
    assert!(session.visited().contains(QuestionId(900)));
}

#[test]
fn co_applicant_branch_caps_at_99_before_review() {
    let mut session = new_session();
    for _ in 0..10 {
        answer_and_advance(&mut session, "co-applicant");
    }

    assert_eq!(
        visited_ids(&session),
        vec![1, 2, 3, 4, 5, 100, 101, 102, 103, 104, 105]
    );
    assert_eq!(session.expected_count(), 11);
    assert!(!session.is_complete());
    assert_eq!(session.progress_percent(), 99);
}

#[test]
fn undetermined_branch_reports_conservatively() {
    let mut session = new_session();
    answer_and_advance(&mut session, "solo");
    answer_and_advance(&mut session, "solo");

    assert_eq!(visited_ids(&session), vec![1, 2, 3]);
    assert_eq!(session.branch(), &BranchKey::UNDETERMINED);
    assert_eq!(session.expected_count(), 12);
    assert_eq!(session.progress_percent(), 25);
    assert!(session.progress_percent() < 30, "solo would show 30% at three visits");
}

#[test]
fn three_backs_from_the_end_shrink_visits_and_progress() {
    let mut session = new_session();
    for _ in 0..9 {
        answer_and_advance(&mut session, "solo");
    }
    assert_eq!(session.visited().size(), 10);
    let before = session.progress_percent();

    for _ in 0..3 {
        session.back().expect("back succeeds");
    }

    assert_eq!(visited_ids(&session), (1..=7).collect::<Vec<u32>>());
    assert_eq!(session.current_question_id(), Some(QuestionId(7)));
    assert!(session.progress_percent() < before);
    assert!(!session.responses().contains_key(&QuestionId(8)));
}

#[test]
fn every_back_lowers_or_holds_progress() {
    let mut session = new_session();
    for _ in 0..8 {
        answer_and_advance(&mut session, "guarantor");
    }
    assert_eq!(session.current_question_id(), Some(QuestionId(203)));

    loop {
        let before = session.progress_percent();
        let previous = session.current_question_id();
        session.back().expect("back succeeds");
        assert!(session.progress_percent() <= before);
        if session.current_question_id() == previous {
            break;
        }
    }
    assert_eq!(session.current_question_id(), Some(QuestionId(1)));
}

#[test]
fn progress_never_drops_while_advancing_inside_a_branch() {
    for pivot in ["solo", "co-applicant", "guarantor"] {
        let mut session = new_session();
        for _ in 0..4 {
            answer_and_advance(&mut session, pivot);
        }
        let question = session.current_question().expect("pivot").clone();
        session
            .answer(question.id, ResponseValue::choice(pivot))
            .expect("pivot accepted");

        let mut last = session.progress_percent();
        while let Advance::Moved { .. } = session.advance().expect("advance") {
            let now = session.progress_percent();
            assert!(now >= last, "{pivot}: {now} < {last}");
            last = now;
            let question = session.current_question().expect("question").clone();
            session
                .answer(question.id, sample_response(&question, pivot))
                .expect("answer accepted");
        }
        assert_eq!(session.progress_percent(), 100);
    }
}

#[test]
fn re_answering_pivot_purges_abandoned_branch() {
    let mut session = new_session();
    for _ in 0..6 {
        answer_and_advance(&mut session, "solo");
    }
    assert_eq!(session.current_question_id(), Some(QuestionId(7)));
    assert!(session.visited().contains(QuestionId(6)));

    session.back().expect("back to 6");
    session.back().expect("back to pivot");
    assert_eq!(session.current_question_id(), Some(QuestionId(5)));

    session
        .answer(QuestionId(5), ResponseValue::choice("co-applicant"))
        .expect("pivot re-answered");

    assert_eq!(visited_ids(&session), vec![1, 2, 3, 4, 5]);
    assert_eq!(session.branch(), &BranchKey::CO_APPLICANT);
    assert_eq!(session.expected_count(), 11);
    assert_eq!(
        FlowResolver::new(session.graph()).expected_count(session.responses()),
        Ok(11)
    );
    assert!(session.responses().keys().all(|id| id.0 <= 5));

    assert_eq!(
        session.advance(),
        Ok(Advance::Moved {
            current_question_id: QuestionId(100)
        })
    );
}

#[test]
fn backing_over_the_pivot_returns_to_undetermined() {
    let mut session = new_session();
    for _ in 0..5 {
        answer_and_advance(&mut session, "guarantor");
    }
    assert_eq!(session.branch(), &BranchKey::GUARANTOR);

    session.back().expect("back to pivot");
    session.back().expect("back to 4");

    assert_eq!(session.branch(), &BranchKey::UNDETERMINED);
    assert!(!session.responses().contains_key(&QuestionId(5)));
    assert_eq!(visited_ids(&session), vec![1, 2, 3, 4]);
}

#[test]
fn resolving_the_branch_may_move_progress_either_way() {
    let mut session = new_session();
    for _ in 0..4 {
        answer_and_advance(&mut session, "solo");
    }
    let undetermined = session.progress_percent();

    session
        .answer(QuestionId(5), ResponseValue::choice("guarantor"))
        .expect("pivot accepted");
    let guarantor = session.progress_percent();
    assert_eq!((undetermined, guarantor), (42, 56));

    session
        .answer(QuestionId(5), ResponseValue::choice("co-applicant"))
        .expect("pivot re-answered");
    let co_applicant = session.progress_percent();

    assert_eq!(session.visited().size(), 5);
    assert_eq!(co_applicant, 45);
    assert!(
        co_applicant < guarantor,
        "a larger denominator may lower progress with the same visits"
    );
}

#[test]
fn completed_session_rejects_further_mutation() {
    let mut session = new_session();
    while answer_and_advance(&mut session, "guarantor") != Advance::Completed {}

    assert!(session.is_complete());
    assert_eq!(session.progress_percent(), 100);
    assert_eq!(session.current_question_id(), None);
    assert_eq!(
        session.current_question().map(|question| question.kind),
        Ok(QuestionKind::Review)
    );

    assert_eq!(
        session.answer(QuestionId(900), ResponseValue::Text("ok".to_string())),
        Err(QuestionnaireError::SessionAlreadyComplete)
    );
    assert_eq!(session.advance(), Err(QuestionnaireError::SessionAlreadyComplete));
    assert_eq!(session.back(), Err(QuestionnaireError::SessionAlreadyComplete));
    assert_eq!(session.progress_percent(), 100);
}

#[test]
fn stale_answer_after_rewind_is_rejected() {
    let mut session = new_session();
    for _ in 0..3 {
        answer_and_advance(&mut session, "solo");
    }
    session.back().expect("back to 3");

    let err = session
        .answer(QuestionId(4), ResponseValue::Amount(1))
        .expect_err("question 4 is no longer current");
    assert_eq!(
        err,
        QuestionnaireError::OutOfOrderAnswer {
            expected: QuestionId(3),
            received: QuestionId(4),
        }
    );
}

#[test]
fn sessions_sharing_a_graph_are_independent() {
    let graph = Arc::new(QuestionGraph::standard());
    let mut first = QuestionnaireSession::new(Arc::clone(&graph));
    let second = QuestionnaireSession::new(graph);

    answer_and_advance(&mut first, "solo");

    assert_eq!(first.visited().size(), 2);
    assert_eq!(second.visited().size(), 1);
    assert!(second.responses().is_empty());
}
