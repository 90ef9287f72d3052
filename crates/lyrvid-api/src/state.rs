//! Application state.

use std::sync::Arc;

use lyrvid_pipeline::adapters::production_services;
use lyrvid_pipeline::{Pipeline, PipelineConfig};
use lyrvid_sources::LrclibClient;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<Pipeline>,
    pub lyrics: Arc<LrclibClient>,
}

impl AppState {
    /// Create application state with production collaborators.
    pub fn new(config: ApiConfig, pipeline_config: PipelineConfig) -> Self {
        let services = production_services(&pipeline_config);
        let pipeline = Pipeline::new(pipeline_config, services);

        Self {
            config,
            pipeline: Arc::new(pipeline),
            lyrics: Arc::new(LrclibClient::new()),
        }
    }
}
