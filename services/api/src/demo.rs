use crate::infra::parse_pivot;
use chrono::NaiveDate;
use clap::Args;
use homeloan_onboarding::config::QuestionnaireConfig;
use homeloan_onboarding::error::AppError;
use homeloan_onboarding::workflows::questionnaire::{
    Advance, BranchKey, Question, QuestionGraph, QuestionKind, QuestionnaireSession, ResponseValue,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Answer given to the pivot question (solo, co-applicant, guarantor)
    #[arg(long, default_value = "solo", value_parser = parse_pivot)]
    pub(crate) branch: String,
    /// Step back this many questions once the walk reaches question N (format N:STEPS)
    #[arg(long, value_parser = parse_rewind)]
    pub(crate) rewind_at: Option<(u32, usize)>,
    /// Load the question graph from a JSON definition instead of the built-in catalogue
    #[arg(long)]
    pub(crate) graph: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogueArgs {
    /// Load the question graph from a JSON definition instead of the built-in catalogue
    #[arg(long)]
    pub(crate) graph: Option<PathBuf>,
    /// Print every question prompt beneath its branch
    #[arg(long)]
    pub(crate) list_questions: bool,
}

fn parse_rewind(raw: &str) -> Result<(u32, usize), String> {
    let (question, steps) = raw
        .split_once(':')
        .ok_or_else(|| format!("'{raw}' must look like QUESTION:STEPS"))?;
    let question = question
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid question id '{question}' ({err})"))?;
    let steps = steps
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("invalid step count '{steps}' ({err})"))?;
    Ok((question, steps))
}

fn load_graph(path: Option<PathBuf>) -> Result<QuestionGraph, AppError> {
    let config = QuestionnaireConfig { graph_path: path };
    Ok(config.load_graph()?)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        branch,
        rewind_at,
        graph,
    } = args;

    let graph = Arc::new(load_graph(graph)?);
    let mut session = QuestionnaireSession::new(graph);
    let mut rewind = rewind_at;

    println!("Home-loan onboarding walkthrough ({branch} applicant)");
    loop {
        let question = session.current_question()?.clone();
        println!(
            "[{:>3}%] {} {} ({})",
            session.progress_percent(),
            question.id,
            question.prompt,
            question.kind.label()
        );

        if let Some((at, steps)) = rewind {
            if question.id.0 == at {
                rewind = None;
                for _ in 0..steps {
                    let previous = session.back()?;
                    println!(
                        "  <- back to {} | {} visited | {}%",
                        previous,
                        session.visited().size(),
                        session.progress_percent()
                    );
                }
                continue;
            }
        }

        let response = scripted_response(&question, &branch);
        println!("  answer: {response}");
        session.answer(question.id, response)?;

        if let Advance::Completed = session.advance()? {
            break;
        }
    }

    println!(
        "[{:>3}%] complete on the {} branch after {} questions",
        session.progress_percent(),
        session.branch().label(),
        session.responses().len()
    );
    Ok(())
}

fn scripted_response(question: &Question, pivot: &str) -> ResponseValue {
    match question.kind {
        QuestionKind::SingleChoice if question.declares_option(pivot) => {
            ResponseValue::choice(pivot)
        }
        QuestionKind::SingleChoice => question
            .options
            .first()
            .map(|option| ResponseValue::choice(option.value.clone()))
            .unwrap_or_else(|| ResponseValue::choice("")),
        QuestionKind::MultiChoice => ResponseValue::Choices(
            question
                .options
                .iter()
                .take(1)
                .map(|option| option.value.clone())
                .collect(),
        ),
        QuestionKind::Text => ResponseValue::Text("Sam Example".to_string()),
        QuestionKind::Date => ResponseValue::Date(
            NaiveDate::from_ymd_opt(1990, 1, 15).unwrap_or_default(),
        ),
        QuestionKind::Amount => ResponseValue::Amount(250_000),
        QuestionKind::Review => ResponseValue::Text(String::new()),
    }
}

pub(crate) fn run_catalogue(args: CatalogueArgs) -> Result<(), AppError> {
    let graph = load_graph(args.graph)?;

    println!("Question graph");
    println!(
        "- pivot {} | review step {} | undetermined estimate {}",
        graph.pivot_question_id(),
        graph.completion_sentinel(),
        graph.expected_count_for(&BranchKey::UNDETERMINED)
    );
    for branch in graph.branches() {
        let order: Vec<String> = graph
            .sequence_for(branch)
            .iter()
            .map(|id| id.0.to_string())
            .collect();
        println!(
            "- {}: {} questions [{}]",
            branch.label(),
            graph.expected_count_for(branch),
            order.join(", ")
        );

        if args.list_questions {
            for id in graph.sequence_for(branch) {
                let question = graph.question_by_id(*id)?;
                println!("    {} {}", question.id, question.prompt);
            }
        }
    }

    Ok(())
}
