//! Background removal contract and HTTP client.
//!
//! The removal model takes a public image URL and produces a processed
//! image. The HTTP implementation resolves the model's output URL and
//! downloads the processed bytes so callers deal in bytes only.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::http::{ensure_success, parse_response};

/// Per-image background removal.
#[async_trait]
pub trait BackgroundRemoval: Send + Sync {
    /// Remove the background of the image at `image_url` and return the
    /// processed image bytes.
    async fn remove(&self, image_url: &str) -> Result<Vec<u8>, ServiceError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Wire shape of removal responses. The model returns either a single
/// output URL or an array of them; the first entry wins.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemovalOutput {
    Single(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RemovalResponse {
    output: RemovalOutput,
}

/// HTTP client for the background-removal service.
pub struct HttpBackgroundRemoval {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    model: String,
}

impl HttpBackgroundRemoval {
    /// Create a client for the removal API.
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_token: String,
        model: String,
    ) -> Self {
        Self {
            client,
            base_url,
            api_token,
            model,
        }
    }
}

#[async_trait]
impl BackgroundRemoval for HttpBackgroundRemoval {
    async fn remove(&self, image_url: &str) -> Result<Vec<u8>, ServiceError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": { "image": image_url },
        });

        let response = self
            .client
            .post(format!("{}/v1/removals", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        let parsed: RemovalResponse = parse_response(response).await?;

        let output_url = match parsed.output {
            RemovalOutput::Single(url) => url,
            RemovalOutput::Many(urls) => urls
                .into_iter()
                .next()
                .ok_or(ServiceError::MissingField("output[0]"))?,
        };

        let download = self.client.get(&output_url).send().await?;
        let download = ensure_success(download).await?;
        Ok(download.bytes().await?.to_vec())
    }
}
