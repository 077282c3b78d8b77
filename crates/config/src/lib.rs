//! Configuration management for the banking assistant
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (BANK_ASSISTANT_ prefix, `__` separator)
//!
//! Also holds the chitchat pattern configuration (file-backed with a
//! built-in default) and the built-in slot templates.

pub mod chitchat;
pub mod settings;
pub mod slots;

pub use chitchat::{ChitchatPatternSet, ChitchatPatterns};
pub use settings::{
    load_settings, load_settings_from, ChitchatSettings, ClassifierConfig, ObservabilityConfig,
    RuntimeEnvironment, ServerConfig, SessionConfig, Settings,
};
pub use slots::{SlotTemplate, SlotTemplates};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
