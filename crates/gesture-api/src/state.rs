//! Application state.

use std::sync::Arc;

use gesture_inference::{ConfigError, InferenceService};

use crate::config::ApiConfig;

/// Shared application state. Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub inference: Arc<InferenceService>,
}

impl AppState {
    /// Load the model and label set named by the config. Fails instead of
    /// producing a partially ready state.
    pub fn load(config: ApiConfig) -> Result<Self, ConfigError> {
        let inference = InferenceService::load(&config.artifacts())?;
        Ok(Self::new(config, Arc::new(inference)))
    }

    pub fn new(config: ApiConfig, inference: Arc<InferenceService>) -> Self {
        Self { config, inference }
    }
}
