//! API configuration.

use std::path::PathBuf;
use std::str::FromStr;

use gesture_inference::ModelArtifacts;
use gesture_models::FEATURE_DIM;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Exported ONNX gesture model
    pub model_path: PathBuf,
    /// JSON array of label names in class-index order
    pub labels_path: PathBuf,
    /// Directory served under /images
    pub images_dir: PathBuf,
    /// Values per feature row the model expects
    pub feature_dim: usize,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            model_path: PathBuf::from("model.onnx"),
            labels_path: PathBuf::from("labels.json"),
            images_dir: PathBuf::from("Images"),
            feature_dim: FEATURE_DIM,
            cors_origins: vec!["*".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_or("API_PORT", defaults.port),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            labels_path: std::env::var("LABELS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.labels_path),
            images_dir: std::env::var("IMAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.images_dir),
            feature_dim: env_or("FEATURE_DIM", defaults.feature_dim),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            max_body_size: env_or("MAX_BODY_SIZE", defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.environment)
    }

    /// Model and label artifacts to load at startup.
    pub fn artifacts(&self) -> ModelArtifacts {
        ModelArtifacts {
            model_path: self.model_path.clone(),
            labels_path: self.labels_path.clone(),
            feature_dim: self.feature_dim,
        }
    }
}

/// Case-insensitive check of an `ENVIRONMENT` value.
pub fn is_production_environment(environment: &str) -> bool {
    environment.trim().eq_ignore_ascii_case("production")
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
