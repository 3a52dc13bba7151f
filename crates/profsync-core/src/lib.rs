//! Shared domain types and configuration for profsync.
//!
//! Holds the observed [`ProfileRecord`], the two profile-sheet layouts and
//! their column schemas, text cleaning helpers, tag-label configuration, and
//! the typed application configuration loaded from the environment.

pub mod app_config;
pub mod config;
pub mod layout;
pub mod record;
pub mod tags;
pub mod text;

use thiserror::Error;

pub use app_config::{AppConfig, InsertionPolicy, StoreBackend, SyncConfig, UpdateMode};
pub use config::{load_app_config, load_app_config_from_env};
pub use layout::{Column, SheetLayout};
pub use record::ProfileRecord;
pub use tags::{load_tag_labels, TagLabels};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read tag labels file {path}: {source}")]
    TagLabelsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tag labels file: {0}")]
    TagLabelsParse(#[from] serde_yaml::Error),
}
