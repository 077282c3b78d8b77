//! Prometheus metrics

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use bank_assistant_core::IntentResult;

use crate::state::AppState;

pub const ANALYZE_TOTAL: &str = "bank_assistant_analyze_total";
pub const ANALYZE_SECONDS: &str = "bank_assistant_analyze_seconds";
pub const ACTIVE_SESSIONS: &str = "bank_assistant_active_sessions";

/// Install the global Prometheus recorder.
///
/// Returns `None` if a recorder is already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            metrics::describe_counter!(ANALYZE_TOTAL, "Analyzed queries by method and intent");
            metrics::describe_histogram!(ANALYZE_SECONDS, "Query analysis latency in seconds");
            metrics::describe_gauge!(ACTIVE_SESSIONS, "Sessions with a conversation context");
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

/// Record one analyzed query
pub fn record_analysis(result: &IntentResult, elapsed: Duration) {
    metrics::counter!(
        ANALYZE_TOTAL,
        "method" => result.method.as_str(),
        "intent" => result.intent.as_str().to_string()
    )
    .increment(1);
    metrics::histogram!(ANALYZE_SECONDS).record(elapsed.as_secs_f64());
}

pub fn record_active_sessions(count: usize) {
    metrics::gauge!(ACTIVE_SESSIONS).set(count as f64);
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => {
            record_active_sessions(state.analyzer.contexts().len());
            (StatusCode::OK, handle.render())
        }
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}
