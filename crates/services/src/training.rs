//! Training service contract and HTTP client.
//!
//! The execution service runs LoRA fine-tuning jobs on GPU hardware.
//! Submission returns a service-assigned ID; status is observed by
//! polling `GET /v1/trainings/{id}`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::http::{ensure_success, parse_response};

/// Hyperparameters for one fine-tuning run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TrainingParams {
    pub steps: u32,
    pub lora_rank: u32,
    pub optimizer: String,
    pub batch_size: u32,
    pub resolution: String,
    pub autocaption: bool,
    pub trigger_word: String,
    pub learning_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocaption_prefix: Option<String>,
}

/// Remote job status as reported by the training service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl RemoteStatus {
    /// Whether the remote run reached a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// Normalized view of one remote training run.
#[derive(Debug, Clone)]
pub struct RemoteTraining {
    pub status: RemoteStatus,
    /// Raw progress logs (free-form text).
    pub logs: String,
    /// Trained weights locator, present once the run succeeded.
    pub weights_url: Option<String>,
}

/// Long-running GPU training jobs executed by an external service.
#[async_trait]
pub trait TrainingService: Send + Sync {
    /// Submit a training job over an uploaded image archive. Returns the
    /// service-assigned job identifier.
    async fn submit(
        &self,
        archive_url: &str,
        params: &TrainingParams,
    ) -> Result<String, ServiceError>;

    /// Fetch the current state of a previously submitted job.
    async fn get(&self, external_id: &str) -> Result<RemoteTraining, ServiceError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Wire shape of `POST /v1/trainings` responses.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

/// Wire shape of `GET /v1/trainings/{id}` responses.
#[derive(Debug, Deserialize)]
struct TrainingResponse {
    status: RemoteStatus,
    #[serde(default)]
    logs: String,
    #[serde(default)]
    output: Option<TrainingOutput>,
}

#[derive(Debug, Deserialize)]
struct TrainingOutput {
    #[serde(default)]
    weights: Option<String>,
}

/// HTTP client for the training service.
pub struct HttpTrainingService {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl HttpTrainingService {
    /// Create a client for the training API.
    ///
    /// * `base_url` - e.g. `https://api.trainer.example`.
    pub fn new(client: reqwest::Client, base_url: String, api_token: String) -> Self {
        Self {
            client,
            base_url,
            api_token,
        }
    }
}

#[async_trait]
impl TrainingService for HttpTrainingService {
    async fn submit(
        &self,
        archive_url: &str,
        params: &TrainingParams,
    ) -> Result<String, ServiceError> {
        let body = serde_json::json!({
            "input": {
                "steps": params.steps,
                "lora_rank": params.lora_rank,
                "optimizer": params.optimizer,
                "batch_size": params.batch_size,
                "resolution": params.resolution,
                "autocaption": params.autocaption,
                "input_images": archive_url,
                "trigger_word": params.trigger_word,
                "learning_rate": params.learning_rate,
                "autocaption_prefix": params.autocaption_prefix,
            },
        });

        let response = self
            .client
            .post(format!("{}/v1/trainings", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        let submitted: SubmitResponse = parse_response(response).await?;

        tracing::info!(external_id = %submitted.id, "Training job submitted");

        Ok(submitted.id)
    }

    async fn get(&self, external_id: &str) -> Result<RemoteTraining, ServiceError> {
        let response = self
            .client
            .get(format!("{}/v1/trainings/{}", self.base_url, external_id))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let parsed: TrainingResponse = response.json().await?;

        Ok(RemoteTraining {
            status: parsed.status,
            logs: parsed.logs,
            weights_url: parsed.output.and_then(|o| o.weights),
        })
    }
}
