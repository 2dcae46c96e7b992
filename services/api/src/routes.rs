use crate::infra::{AppState, SessionStore, SessionView};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use homeloan_onboarding::error::AppError;
use homeloan_onboarding::workflows::questionnaire::{Question, QuestionId, ResponseValue};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerRequest {
    pub(crate) question_id: QuestionId,
    pub(crate) response: ResponseValue,
}

/// Questionnaire session endpoints.
pub(crate) fn questionnaire_router(store: Arc<SessionStore>) -> Router {
    Router::new()
        .route("/api/v1/questionnaire/sessions", post(create_session))
        .route(
            "/api/v1/questionnaire/sessions/:session_id",
            get(get_session).delete(delete_session),
        )
        .route(
            "/api/v1/questionnaire/sessions/:session_id/answers",
            post(answer_question),
        )
        .route(
            "/api/v1/questionnaire/sessions/:session_id/advance",
            post(advance_session),
        )
        .route(
            "/api/v1/questionnaire/sessions/:session_id/back",
            post(back_session),
        )
        .route(
            "/api/v1/questionnaire/sessions/:session_id/restart",
            post(restart_session),
        )
        .route(
            "/api/v1/questionnaire/questions/:question_id",
            get(get_question),
        )
        .with_state(store)
}

pub(crate) fn with_questionnaire_routes(store: Arc<SessionStore>) -> Router {
    questionnaire_router(store)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn create_session(
    State(store): State<Arc<SessionStore>>,
) -> (StatusCode, Json<SessionView>) {
    (StatusCode::CREATED, Json(store.create()))
}

pub(crate) async fn get_session(
    State(store): State<Arc<SessionStore>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    store.view(&session_id).map(Json)
}

pub(crate) async fn delete_session(
    State(store): State<Arc<SessionStore>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    store.remove(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn answer_question(
    State(store): State<Arc<SessionStore>>,
    Path(session_id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionView>, AppError> {
    let AnswerRequest {
        question_id,
        response,
    } = request;

    store
        .update(&session_id, |session| session.answer(question_id, response))
        .map(Json)
}

pub(crate) async fn advance_session(
    State(store): State<Arc<SessionStore>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    store
        .update(&session_id, |session| session.advance().map(|_| ()))
        .map(Json)
}

pub(crate) async fn back_session(
    State(store): State<Arc<SessionStore>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    store
        .update(&session_id, |session| session.back().map(|_| ()))
        .map(Json)
}

pub(crate) async fn restart_session(
    State(store): State<Arc<SessionStore>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    store
        .update(&session_id, |session| {
            session.restart();
            Ok(())
        })
        .map(Json)
}

pub(crate) async fn get_question(
    State(store): State<Arc<SessionStore>>,
    Path(question_id): Path<u32>,
) -> Result<Json<Question>, AppError> {
    let question = store.graph().question_by_id(QuestionId(question_id))?;
    Ok(Json(question.clone()))
}
