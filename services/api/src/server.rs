use crate::cli::ServeArgs;
use crate::infra::{AppState, SessionStore};
use crate::routes::with_questionnaire_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use homeloan_onboarding::config::AppConfig;
use homeloan_onboarding::error::AppError;
use homeloan_onboarding::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let graph = Arc::new(config.questionnaire.load_graph()?);
    info!(
        source = ?config.questionnaire.graph_path,
        questions = graph.questions().count(),
        branches = graph.branches().count(),
        "question graph loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(SessionStore::new(graph));
    let app = with_questionnaire_routes(store)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "onboarding questionnaire service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
