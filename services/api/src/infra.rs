use homeloan_onboarding::error::AppError;
use homeloan_onboarding::workflows::questionnaire::{
    QuestionGraph, QuestionnaireError, QuestionnaireSession, SessionSnapshot,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Sessions untouched for this long are dropped on the next `create`.
pub(crate) const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

fn next_session_id() -> String {
    format!("qs-{}", Uuid::new_v4().simple())
}

struct StoredSession {
    session: QuestionnaireSession,
    touched: Instant,
}

/// Snapshot tagged with the id the UI uses to address its session.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SessionView {
    pub(crate) session_id: String,
    #[serde(flatten)]
    pub(crate) snapshot: SessionSnapshot,
}

/// Independent questionnaire sessions sharing one immutable graph. Ids are random
/// so one applicant cannot address another's session by counting.
pub(crate) struct SessionStore {
    graph: Arc<QuestionGraph>,
    idle_timeout: Duration,
    sessions: Mutex<HashMap<String, StoredSession>>,
}

impl SessionStore {
    pub(crate) fn new(graph: Arc<QuestionGraph>) -> Self {
        Self::with_idle_timeout(graph, DEFAULT_IDLE_TIMEOUT)
    }

    pub(crate) fn with_idle_timeout(graph: Arc<QuestionGraph>, idle_timeout: Duration) -> Self {
        Self {
            graph,
            idle_timeout,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn graph(&self) -> &QuestionGraph {
        &self.graph
    }

    pub(crate) fn create(&self) -> SessionView {
        let session_id = next_session_id();
        let session = QuestionnaireSession::new(Arc::clone(&self.graph));
        let snapshot = session.snapshot();

        let now = Instant::now();
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        let before = guard.len();
        guard.retain(|_, stored| now.duration_since(stored.touched) < self.idle_timeout);
        let expired = before - guard.len();
        guard.insert(
            session_id.clone(),
            StoredSession {
                session,
                touched: now,
            },
        );
        debug!(%session_id, expired, "questionnaire session created");

        SessionView {
            session_id,
            snapshot,
        }
    }

    /// Runs `action` against one session and returns its refreshed snapshot.
    pub(crate) fn update<F>(&self, session_id: &str, action: F) -> Result<SessionView, AppError>
    where
        F: FnOnce(&mut QuestionnaireSession) -> Result<(), QuestionnaireError>,
    {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        let stored = guard
            .get_mut(session_id)
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))?;

        stored.touched = Instant::now();
        action(&mut stored.session)?;

        Ok(SessionView {
            session_id: session_id.to_string(),
            snapshot: stored.session.snapshot(),
        })
    }

    pub(crate) fn remove(&self, session_id: &str) -> Result<(), AppError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        if guard.remove(session_id).is_none() {
            return Err(AppError::SessionNotFound(session_id.to_string()));
        }
        debug!(%session_id, "questionnaire session removed");
        Ok(())
    }

    pub(crate) fn view(&self, session_id: &str) -> Result<SessionView, AppError> {
        self.update(session_id, |_| Ok(()))
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.lock().expect("session mutex poisoned").len()
    }
}

pub(crate) fn parse_pivot(raw: &str) -> Result<String, String> {
    let value = raw.trim().to_ascii_lowercase();
    match value.as_str() {
        "solo" | "co-applicant" | "guarantor" => Ok(value),
        "co_applicant" | "coapplicant" => Ok("co-applicant".to_string()),
        _ => Err(format!(
            "'{raw}' is not a branch (expected solo, co-applicant or guarantor)"
        )),
    }
}
