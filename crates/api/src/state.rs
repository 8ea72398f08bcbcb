use std::sync::Arc;

use atelier_pipeline::generation::GenerationFlow;
use atelier_pipeline::poller::StatusPoller;
use atelier_pipeline::submission::SubmissionPipeline;
use atelier_pipeline::PipelineConfig;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: atelier_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Pipeline configuration (costs, windows, retry limits).
    pub pipeline_config: Arc<PipelineConfig>,
    /// Training submission flow.
    pub submission: Arc<SubmissionPipeline>,
    /// Status polling / reconciliation flow.
    pub poller: Arc<StatusPoller>,
    /// On-demand generation flow.
    pub generation: Arc<GenerationFlow>,
}
