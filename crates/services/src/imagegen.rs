//! Image synthesis contract and HTTP client (diffusion service).

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ServiceError;
use crate::http::parse_response;

/// Guidance scale used for every synthesis run.
const GUIDANCE_SCALE: f64 = 3.5;

/// Inference step count used for every synthesis run.
const INFERENCE_STEPS: u32 = 50;

/// Weight applied to each style adapter.
const ADAPTER_SCALE: f64 = 0.85;

/// One synthesis request.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub prompt: String,
    /// Style adapter identifiers loaded alongside the base model.
    pub style_adapters: Vec<String>,
    /// Number of output images.
    pub count: u32,
    /// e.g. `"1:1"`, `"9:16"`.
    pub aspect_ratio: String,
    /// e.g. `"png"`, `"webp"`.
    pub output_format: String,
}

/// Diffusion-based image generation.
#[async_trait]
pub trait ImageSynthesis: Send + Sync {
    /// Generate images and return their output URLs.
    async fn generate(&self, request: &SynthesisRequest) -> Result<Vec<String>, ServiceError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Wire shape of synthesis responses.
#[derive(Debug, Deserialize)]
struct SynthesisResponse {
    output: Vec<String>,
}

/// HTTP client for the image-synthesis service.
pub struct HttpImageSynthesis {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    model: String,
}

impl HttpImageSynthesis {
    /// Create a client for the synthesis API.
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
impl ImageSynthesis for HttpImageSynthesis {
    async fn generate(&self, request: &SynthesisRequest) -> Result<Vec<String>, ServiceError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": {
                "prompt": request.prompt,
                "hf_loras": request.style_adapters,
                "lora_scales": [ADAPTER_SCALE],
                "num_outputs": request.count,
                "aspect_ratio": request.aspect_ratio,
                "output_format": request.output_format,
                "guidance_scale": GUIDANCE_SCALE,
                "output_quality": 100,
                "prompt_strength": 1,
                "num_inference_steps": INFERENCE_STEPS,
            },
        });

        let response = self
            .client
            .post(format!("{}/v1/generations", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        let parsed: SynthesisResponse = parse_response(response).await?;

        tracing::debug!(count = parsed.output.len(), "Image synthesis returned outputs");

        Ok(parsed.output)
    }
}
