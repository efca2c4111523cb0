use crate::constants::DEFAULT_MODEL_FILE;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level service configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub model: ModelConfig,
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    /// Maximum accepted request body, applies to dataset uploads.
    pub upload_limit_mb: usize,
}

/// Cross-origin policy for browser clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Block compression applied to persisted blobs.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

/// Where and how the trained artifact is persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub compression: Compression,
}

/// Training hyperparameters and preprocessing knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Columns with a smaller non-missing fraction are dropped before collapsing.
    pub completeness_threshold: f64,
    /// Datasets larger than this are down-sampled.
    pub max_rows: usize,
    pub seed: u64,
    /// Fraction of prepared rows held out from fitting.
    pub test_size: f64,
    pub n_trees: usize,
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
    /// Run the cross-validated grid search before the final fit.
    pub search: bool,
    pub cv_folds: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
    /// Emit JSON lines to the log files.
    pub json: bool,
    pub max_files: usize,
    /// Extra `EnvFilter` directives, e.g. `spore_ml=debug`.
    pub filter: Option<String>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 8000, upload_limit_mb: 64 }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost".to_owned(), "http://localhost:8000".to_owned()],
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_MODEL_FILE), compression: Compression::None }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            completeness_threshold: 0.7,
            max_rows: 12_000,
            seed: 42,
            test_size: 0.25,
            n_trees: 150,
            min_samples_split: 10,
            max_depth: None,
            search: false,
            cv_folds: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), directory: None, json: false, max_files: 10, filter: None }
    }
}
