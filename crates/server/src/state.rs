//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use bank_assistant_agent::QueryAnalyzer;
use bank_assistant_config::Settings;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub analyzer: Arc<QueryAnalyzer>,
    /// Absent when metrics are disabled or the recorder could not be installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build the analyzer from settings
    pub fn new(config: Settings) -> Self {
        let analyzer = QueryAnalyzer::from_settings(&config);
        Self::with_analyzer(config, analyzer)
    }

    pub fn with_analyzer(config: Settings, analyzer: QueryAnalyzer) -> Self {
        Self {
            config: Arc::new(config),
            analyzer: Arc::new(analyzer),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}
