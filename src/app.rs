use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::handlers;
use crate::service::Dashboard;

/// Format latency in human-readable units
fn format_latency(duration: std::time::Duration) -> String {
    let micros = duration.as_micros();
    if micros < 1000 {
        format!("{}µs", micros)
    } else if micros < 1_000_000 {
        format!("{}ms", micros / 1000)
    } else {
        format!("{:.1}s", micros as f64 / 1_000_000.0)
    }
}

pub struct AppState {
    pub dashboard: Dashboard,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self { dashboard }
    }
}

pub fn create_app(state: SharedAppState) -> Router {
    Router::new()
        .route("/api/metrics", get(handlers::dashboard_metrics))
        .route("/api/metrics/tests", get(handlers::test_metrics))
        .route(
            "/api/test-cases",
            get(handlers::list_test_cases).post(handlers::create_test_case),
        )
        .route(
            "/api/test-cases/:id/executions",
            get(handlers::list_executions).post(handlers::record_execution),
        )
        .route("/api/board", get(handlers::board))
        .route("/api/integrations/:id/sync", post(handlers::sync_integration))
        .route("/api/integrations/:id/syncs", get(handlers::sync_history))
        .route(
            "/api/reports",
            get(handlers::list_reports).post(handlers::generate_report),
        )
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    static REQUEST_ID: AtomicU64 = AtomicU64::new(1);
                    let request_id_num = REQUEST_ID.fetch_add(1, Ordering::Relaxed);
                    let generator = block_id::BlockId::new(
                        block_id::Alphabet::alphanumeric(),
                        1234,
                        5,
                    );
                    let request_id = generator
                        .encode_string(request_id_num)
                        .unwrap_or_else(|| request_id_num.to_string());
                    tracing::info_span!(
                        "request",
                        id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &Span| {
                    tracing::info!("-> {} {}", request.method(), request.uri());
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &Span| {
                        tracing::info!(
                            "<- {} latency={}",
                            response.status().as_u16(),
                            format_latency(latency)
                        );
                    },
                ),
        )
        .layer(CompressionLayer::new())
}
