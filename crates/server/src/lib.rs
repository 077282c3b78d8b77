//! Banking Assistant Server
//!
//! Thin HTTP layer over the query analyzer: chat analysis, per-session
//! context reset, health and Prometheus metrics.

pub mod http;
pub mod metrics;
pub mod state;
pub mod sweeper;

pub use http::create_router;
pub use crate::metrics::{init_metrics, record_active_sessions, record_analysis};
pub use state::AppState;
pub use sweeper::start_context_sweeper;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<&ServerError> for StatusCode {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        (status, Json(serde_json::json!({ "message": self.to_string() }))).into_response()
    }
}
