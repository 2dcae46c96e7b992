use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::questionnaire::{GraphError, QuestionnaireError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Graph(GraphError),
    Questionnaire(QuestionnaireError),
    SessionNotFound(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Questionnaire(err) => match err {
                QuestionnaireError::NotFound(_) => StatusCode::NOT_FOUND,
                QuestionnaireError::OutOfOrderAnswer { .. }
                | QuestionnaireError::SessionAlreadyComplete => StatusCode::CONFLICT,
                QuestionnaireError::UnknownBranchValue { .. }
                | QuestionnaireError::InvalidResponse { .. }
                | QuestionnaireError::MissingAnswer(_) => StatusCode::UNPROCESSABLE_ENTITY,
            },
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) | AppError::Graph(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Graph(err) => write!(f, "questionnaire graph error: {}", err),
            AppError::Questionnaire(err) => write!(f, "{}", err),
            AppError::SessionNotFound(id) => write!(f, "questionnaire session {} not found", id),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Graph(err) => Some(err),
            AppError::Questionnaire(err) => Some(err),
            AppError::SessionNotFound(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<GraphError> for AppError {
    fn from(value: GraphError) -> Self {
        Self::Graph(value)
    }
}

impl From<QuestionnaireError> for AppError {
    fn from(value: QuestionnaireError) -> Self {
        Self::Questionnaire(value)
    }
}
