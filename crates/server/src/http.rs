//! HTTP Endpoints
//!
//! REST API for the query analyzer.

use std::time::Instant;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use bank_assistant_core::IntentResult;

use crate::metrics::{metrics_handler, record_analysis};
use crate::state::AppState;
use crate::ServerError;

const DEFAULT_DEV_ORIGIN: &str = "http://localhost:5173";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/api/chat/analyze", post(analyze))
        .route("/api/sessions/:id/context", delete(clear_context))
        .route("/api/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins, falling back to the local
/// dev origin when none parse
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let mut parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %origin, "Invalid CORS origin");
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to {}", DEFAULT_DEV_ORIGIN);
        parsed.push(HeaderValue::from_static(DEFAULT_DEV_ORIGIN));
    }

    tracing::info!("CORS configured with {} origins", parsed.len());
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    #[serde(default)]
    query: String,
    #[serde(default)]
    session_id: Option<String>,
}

/// `POST /api/chat/analyze`
async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<IntentResult>, ServerError> {
    if request.query.trim().is_empty() {
        return Err(ServerError::InvalidRequest("Query is required".to_string()));
    }

    let analyzer = state.analyzer.clone();
    let started = Instant::now();

    // Same-session turns wait on the session lock; keep that off the runtime
    let result = tokio::task::spawn_blocking(move || {
        analyzer.analyze(&request.query, request.session_id.as_deref())
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))?;

    record_analysis(&result, started.elapsed());
    Ok(Json(result))
}

/// `DELETE /api/sessions/:id/context`
async fn clear_context(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if state.analyzer.clear_context(&id) {
        tracing::info!(session_id = %id, "Conversation context cleared");
    }
    StatusCode::NO_CONTENT
}

/// `GET /api/health`
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "ml_enabled": state.analyzer.is_ml(),
        "sessions": state.analyzer.contexts().len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    use bank_assistant_agent::{ConversationContextStore, IntentClassifier, QueryAnalyzer};
    use bank_assistant_config::{ClassifierConfig, Settings};
    use bank_assistant_text_processing::ChitchatMatcher;

    fn state() -> AppState {
        let analyzer = QueryAnalyzer::new(
            IntentClassifier::rules(&ClassifierConfig::default()),
            ChitchatMatcher::builtin(true),
            Arc::new(ConversationContextStore::default()),
        );
        AppState::with_analyzer(Settings::default(), analyzer)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_returns_intent_result() {
        let app = create_router(state());
        let response = app
            .oneshot(post_json(
                "/api/chat/analyze",
                serde_json::json!({ "query": "I lost my credit card", "sessionId": "s1" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["intent"], "lost_card");
        assert_eq!(body["method"], "rule");
        assert_eq!(body["entities"][0]["label"], "CARD_TYPE");
        assert_eq!(body["conversation_complete"], true);
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let app = create_router(state());
        for body in [serde_json::json!({ "query": "  " }), serde_json::json!({})] {
            let response = app
                .clone()
                .oneshot(post_json("/api/chat/analyze", body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(response).await["message"], "Query is required");
        }
    }

    #[tokio::test]
    async fn test_clear_context() {
        let state = state();
        state.analyzer.analyze("transfer money", Some("s1"));
        let app = create_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/sessions/s1/context")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(!state.analyzer.contexts().contains("s1"));
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(state());
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["ml_enabled"], false);
        assert_eq!(body["sessions"], 0);
    }

    #[tokio::test]
    async fn test_metrics_disabled_without_recorder() {
        let app = create_router(state());
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
