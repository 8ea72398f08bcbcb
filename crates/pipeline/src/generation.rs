//! On-demand generation: refusal-guarded prompt writing, image
//! synthesis, and per-image persistence.
//!
//! Stateless with respect to jobs: nothing here touches the job table.
//! The only shared state is the credit balance, charged up front when a
//! request exceeds its product's free quota.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use atelier_core::category::{merge_style_adapters, ProductCategory};
use atelier_core::prompt::{
    decorate_synthesis_prompt, render_instruction, PromptInputs, SYSTEM_PROMPT,
};
use atelier_core::refusal::is_refusal;
use atelier_core::types::EntityId;
use atelier_db::models::prediction::{NewPrediction, Prediction};
use atelier_db::repositories::PredictionRepo;
use atelier_services::{ImageSynthesis, SynthesisRequest, TextGeneration};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::ledger::Ledger;

/// One on-demand generation request.
#[derive(Debug)]
pub struct GenerationRequest {
    pub user_id: EntityId,
    pub product_id: String,
    pub category: ProductCategory,
    /// Base product description.
    pub prompt: Option<String>,
    /// Caller-chosen scene/location override.
    pub custom_prompt: Option<String>,
    /// Free-form extra details.
    pub extra_detail: Option<String>,
    /// Product reference image shown to the text-generation service.
    pub reference_image_url: Option<String>,
    /// Caller-supplied style adapters, merged onto category defaults.
    pub style_adapters: Vec<String>,
    pub image_count: u32,
    pub aspect_ratio: String,
    pub output_format: String,
}

/// Orchestrates prompt generation and image synthesis.
pub struct GenerationFlow {
    pool: PgPool,
    textgen: Arc<dyn TextGeneration>,
    synthesizer: Arc<dyn ImageSynthesis>,
    config: Arc<PipelineConfig>,
}

impl GenerationFlow {
    pub fn new(
        pool: PgPool,
        textgen: Arc<dyn TextGeneration>,
        synthesizer: Arc<dyn ImageSynthesis>,
        config: Arc<PipelineConfig>,
    ) -> Self {
        Self {
            pool,
            textgen,
            synthesizer,
            config,
        }
    }

    /// Run the full generation flow and return the persisted rows.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<Vec<Prediction>, PipelineError> {
        self.validate(&request)?;
        self.charge_quota_overflow(&request).await?;

        let inputs = PromptInputs {
            base_prompt: request.prompt.clone(),
            custom_prompt: request.custom_prompt.clone(),
            extra_detail: request.extra_detail.clone(),
        };
        let instruction = render_instruction(request.category, &inputs);

        let description = generate_description(
            self.textgen.as_ref(),
            &instruction,
            request.reference_image_url.as_deref(),
            self.config.generation.max_attempts,
            self.config.generation.retry_delay,
        )
        .await?;

        let synthesis = SynthesisRequest {
            prompt: decorate_synthesis_prompt(request.category, &description),
            style_adapters: merge_style_adapters(request.category, &request.style_adapters),
            count: request.image_count,
            aspect_ratio: request.aspect_ratio.clone(),
            output_format: request.output_format.clone(),
        };
        let image_urls = self.synthesizer.generate(&synthesis).await?;

        // Each image is its own insert. A failed insert loses that image
        // only; earlier rows stay (no batch atomicity here).
        let mut saved = Vec::with_capacity(image_urls.len());
        for image_url in image_urls {
            let row = NewPrediction {
                user_id: request.user_id,
                product_id: request.product_id.clone(),
                image_url,
                category: request.category.name().to_string(),
                source_image_url: request.reference_image_url.clone(),
            };
            match PredictionRepo::insert(&self.pool, &row).await {
                Ok(prediction) => saved.push(prediction),
                Err(e) => {
                    tracing::error!(user_id = %request.user_id, error = %e,
                        "Failed to persist prediction; continuing with remaining images");
                }
            }
        }

        tracing::info!(user_id = %request.user_id, product_id = %request.product_id,
            saved = saved.len(), "Generation complete");

        Ok(saved)
    }

    fn validate(&self, request: &GenerationRequest) -> Result<(), PipelineError> {
        if request.product_id.trim().is_empty() {
            return Err(PipelineError::Validation(
                "product_id is required".to_string(),
            ));
        }
        if request.image_count == 0 {
            return Err(PipelineError::Validation(
                "image_count must be positive".to_string(),
            ));
        }
        if request.image_count > self.config.generation.max_images {
            return Err(PipelineError::Validation(format!(
                "image_count cannot exceed {}",
                self.config.generation.max_images
            )));
        }
        Ok(())
    }

    /// Charge for images beyond the product's free quota, before any
    /// external call. An unaffordable overflow fails the whole request.
    async fn charge_quota_overflow(
        &self,
        request: &GenerationRequest,
    ) -> Result<(), PipelineError> {
        let settings = &self.config.generation;
        let existing =
            PredictionRepo::count_for_product(&self.pool, request.user_id, &request.product_id)
                .await?;

        let total = existing + i64::from(request.image_count);
        let overflow = total - settings.free_quota_per_product;
        if overflow <= 0 {
            return Ok(());
        }

        let billable = overflow.min(i64::from(request.image_count));
        let cost = billable * settings.per_image_cost;

        Ledger::reserve(&self.pool, request.user_id, cost).await?;

        tracing::info!(user_id = %request.user_id, product_id = %request.product_id,
            billable, cost, "Charged quota overflow");
        Ok(())
    }
}

/// Run the refusal-guarded completion loop.
///
/// Makes up to `max_attempts` calls; a refusal reply triggers a fixed
/// `retry_delay` wait and an identical retry. Exhausting the attempt
/// limit fails with [`PipelineError::RefusalExhausted`]; a refusal
/// string is never returned as a usable description.
pub async fn generate_description(
    textgen: &dyn TextGeneration,
    instruction: &str,
    reference_image_url: Option<&str>,
    max_attempts: u32,
    retry_delay: Duration,
) -> Result<String, PipelineError> {
    for attempt in 1..=max_attempts {
        let reply = textgen
            .complete(SYSTEM_PROMPT, instruction, reference_image_url)
            .await?;

        if !is_refusal(&reply) {
            return Ok(reply);
        }

        tracing::warn!(attempt, max_attempts, "Text generation declined; retrying");
        if attempt < max_attempts {
            tokio::time::sleep(retry_delay).await;
        }
    }

    Err(PipelineError::RefusalExhausted {
        attempts: max_attempts,
    })
}
