//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation
    #[default]
    Development,
    Staging,
    Production,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Intent classifier configuration
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Chitchat matcher configuration
    #[serde(default)]
    pub chitchat: ChitchatSettings,

    /// Conversation context store configuration
    #[serde(default)]
    pub sessions: SessionConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Intent classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Path of the trained model artifact (JSON)
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// ML predictions below this posterior are reported as fallback
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,

    /// Confidence reported when a keyword rule matches
    #[serde(default = "default_rule_confidence")]
    pub rule_confidence: f32,

    /// Confidence reported when no keyword rule matches
    #[serde(default = "default_rule_default_confidence")]
    pub rule_default_confidence: f32,
}

fn default_model_path() -> String {
    "models/intent_model.json".to_string()
}

fn default_min_confidence() -> f32 {
    0.3
}

fn default_rule_confidence() -> f32 {
    0.85
}

fn default_rule_default_confidence() -> f32 {
    0.6
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            min_confidence: default_min_confidence(),
            rule_confidence: default_rule_confidence(),
            rule_default_confidence: default_rule_default_confidence(),
        }
    }
}

/// Chitchat matcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChitchatSettings {
    /// Optional pattern file (YAML, JSON or TOML); built-in patterns otherwise
    #[serde(default)]
    pub patterns_path: Option<String>,

    /// Always answer with the first response of a category (test mode)
    #[serde(default)]
    pub deterministic: bool,

    /// Fixed confidence reported for chitchat matches
    #[serde(default = "default_chitchat_confidence")]
    pub confidence: f32,
}

fn default_chitchat_confidence() -> f32 {
    0.95
}

impl Default for ChitchatSettings {
    fn default() -> Self {
        Self {
            patterns_path: None,
            deterministic: false,
            confidence: default_chitchat_confidence(),
        }
    }
}

/// Conversation context store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Contexts idle for longer than this are discarded
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Least recently updated contexts are evicted past this count
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Interval of the background expiry sweep
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

fn default_ttl_seconds() -> u64 {
    1800 // 30 minutes
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            max_sessions: default_max_sessions(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

/// Logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_classifier()?;
        self.validate_chitchat()?;
        self.validate_sessions()?;
        Ok(())
    }

    fn validate_classifier(&self) -> Result<(), ConfigError> {
        let classifier = &self.classifier;

        for (field, value) in [
            ("classifier.min_confidence", classifier.min_confidence),
            ("classifier.rule_confidence", classifier.rule_confidence),
            (
                "classifier.rule_default_confidence",
                classifier.rule_default_confidence,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be between 0.0 and 1.0, got {}", value),
                });
            }
        }

        if classifier.rule_default_confidence > classifier.rule_confidence {
            return Err(ConfigError::InvalidValue {
                field: "classifier.rule_default_confidence".to_string(),
                message: "Must not exceed classifier.rule_confidence".to_string(),
            });
        }

        if classifier.model_path.trim().is_empty() {
            return Err(ConfigError::MissingField("classifier.model_path".to_string()));
        }

        Ok(())
    }

    fn validate_chitchat(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.chitchat.confidence) {
            return Err(ConfigError::InvalidValue {
                field: "chitchat.confidence".to_string(),
                message: format!(
                    "Must be between 0.0 and 1.0, got {}",
                    self.chitchat.confidence
                ),
            });
        }
        Ok(())
    }

    fn validate_sessions(&self) -> Result<(), ConfigError> {
        if self.sessions.ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.ttl_seconds".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.sessions.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.max_sessions".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.sessions.sweep_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sessions.sweep_interval_seconds".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Load settings from `config/` and the environment
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from `{dir}/default`, then `{dir}/{env}`, then environment
/// variables (`BANK_ASSISTANT__SECTION__KEY`)
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("BANK_ASSISTANT")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
