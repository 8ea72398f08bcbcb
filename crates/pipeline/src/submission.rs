//! Submission pipeline: uploads, background removal, archiving, and
//! training kickoff.
//!
//! Credits are handled before any external work (an unaffordable request
//! touches neither storage nor the job table). Once the training service
//! has confirmed a submission, a failure no longer refunds: the provider
//! may already be doing billable work.

use std::sync::Arc;

use futures::future::try_join_all;
use sqlx::PgPool;
use uuid::Uuid;

use atelier_core::imaging::{is_image_content_type, normalize_to_png, PNG_CONTENT_TYPE};
use atelier_core::types::EntityId;
use atelier_db::models::training_job::{CreateTrainingJob, TrainingJob};
use atelier_db::repositories::{TrainingJobRepo, UserRepo};
use atelier_services::{BackgroundRemoval, ObjectStorage, TrainingService};

use crate::archive::ZipBuilder;
use crate::config::{ChargePoint, PipelineConfig};
use crate::error::PipelineError;
use crate::ledger::Ledger;

/// One uploaded file from the client request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A training submission.
#[derive(Debug)]
pub struct SubmissionRequest {
    pub user_id: EntityId,
    pub images: Vec<UploadedImage>,
    /// Optional cover shot shown in the client's product gallery.
    pub cover_image_url: Option<String>,
    /// Product kind hint; `"jewelry"` selects the larger adapter rank.
    pub product_kind: Option<String>,
}

/// Everything the submission produced.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub job: TrainingJob,
    pub uploaded_urls: Vec<String>,
    pub processed_urls: Vec<String>,
    pub archive_url: String,
}

/// Intermediate result of the storage/removal/archive stages.
struct StagedInputs {
    uploaded_urls: Vec<String>,
    processed_urls: Vec<String>,
    archive_url: String,
}

/// Orchestrates one training submission end to end.
pub struct SubmissionPipeline {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
    remover: Arc<dyn BackgroundRemoval>,
    trainer: Arc<dyn TrainingService>,
    config: Arc<PipelineConfig>,
}

impl SubmissionPipeline {
    pub fn new(
        pool: PgPool,
        storage: Arc<dyn ObjectStorage>,
        remover: Arc<dyn BackgroundRemoval>,
        trainer: Arc<dyn TrainingService>,
        config: Arc<PipelineConfig>,
    ) -> Self {
        Self {
            pool,
            storage,
            remover,
            trainer,
            config,
        }
    }

    /// Run the full submission flow, producing a pending job.
    pub async fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionOutcome, PipelineError> {
        self.validate(&request)?;

        let user_id = request.user_id;
        UserRepo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "User",
                id: user_id,
            })?;

        let cost = self.config.credit.job_cost;
        match self.config.credit.charge_point {
            ChargePoint::Submission => Ledger::reserve(&self.pool, user_id, cost).await?,
            ChargePoint::Completion => Ledger::check_affordable(&self.pool, user_id, cost).await?,
        }

        let job = TrainingJobRepo::create(
            &self.pool,
            &CreateTrainingJob {
                id: Uuid::new_v4(),
                user_id,
                is_paid: self.config.credit.charge_point == ChargePoint::Submission,
                cover_image_url: request.cover_image_url.clone(),
            },
        )
        .await?;

        tracing::info!(job_id = %job.id, %user_id, images = request.images.len(),
            "Training submission accepted");

        let staged = match self.stage_inputs(job.id, request.images).await {
            Ok(staged) => staged,
            Err(e) => {
                self.fail_unconfirmed(&job, &e).await?;
                return Err(e);
            }
        };

        let params = self
            .config
            .submission
            .training_params(request.product_kind.as_deref());

        let external_id = match self.trainer.submit(&staged.archive_url, &params).await {
            Ok(id) => id,
            Err(e) => {
                let e = PipelineError::from(e);
                self.fail_unconfirmed(&job, &e).await?;
                return Err(e);
            }
        };

        // Submission is confirmed: failures past this point keep the
        // debit (the provider is already training).
        let first_processed: Vec<&String> = staged.processed_urls.iter().take(3).collect();
        if let Err(e) = TrainingJobRepo::record_submission(
            &self.pool,
            job.id,
            &external_id,
            &serde_json::json!(first_processed),
        )
        .await
        {
            TrainingJobRepo::mark_failed(&self.pool, job.id, "Failed to record submission")
                .await?;
            return Err(e.into());
        }

        let job = TrainingJobRepo::find_by_id(&self.pool, job.id)
            .await?
            .ok_or(PipelineError::NotFound {
                entity: "TrainingJob",
                id: job.id,
            })?;

        Ok(SubmissionOutcome {
            job,
            uploaded_urls: staged.uploaded_urls,
            processed_urls: staged.processed_urls,
            archive_url: staged.archive_url,
        })
    }

    /// Standalone background removal (no job, no credits): upload the
    /// originals, strip each background, normalize to PNG, re-upload,
    /// and return the processed URLs.
    pub async fn strip_backgrounds(
        &self,
        images: Vec<UploadedImage>,
    ) -> Result<Vec<String>, PipelineError> {
        if images.is_empty() {
            return Err(PipelineError::Validation(
                "At least one image file is required".to_string(),
            ));
        }
        for image in &images {
            Self::require_image(image)?;
        }

        let uploaded_urls = self.upload_originals(images).await?;

        let mut processed_urls = Vec::with_capacity(uploaded_urls.len());
        for url in &uploaded_urls {
            let (_, processed_url) = self.remove_and_store(url).await?;
            processed_urls.push(processed_url);
        }

        Ok(processed_urls)
    }

    // ---- stages ----

    fn validate(&self, request: &SubmissionRequest) -> Result<(), PipelineError> {
        let settings = &self.config.submission;
        let count = request.images.len();

        if count == 0 {
            return Err(PipelineError::Validation(
                "At least one image file is required".to_string(),
            ));
        }
        if count < settings.min_images {
            return Err(PipelineError::Validation(format!(
                "At least {} images are required, got {count}",
                settings.min_images
            )));
        }
        if count > settings.max_images {
            return Err(PipelineError::Validation(format!(
                "At most {} images are allowed, got {count}",
                settings.max_images
            )));
        }
        for image in &request.images {
            Self::require_image(image)?;
        }
        Ok(())
    }

    fn require_image(image: &UploadedImage) -> Result<(), PipelineError> {
        if !is_image_content_type(&image.content_type) {
            return Err(PipelineError::Validation(format!(
                "File '{}' has unsupported content type '{}'",
                image.file_name, image.content_type
            )));
        }
        Ok(())
    }

    /// Upload the original files concurrently under collision-free names.
    async fn upload_originals(
        &self,
        images: Vec<UploadedImage>,
    ) -> Result<Vec<String>, PipelineError> {
        let uploads = images.into_iter().map(|image| {
            let storage = Arc::clone(&self.storage);
            async move {
                let name = format!("{}_{}", Uuid::new_v4(), image.file_name);
                storage.put(&name, image.bytes, &image.content_type).await
            }
        });
        Ok(try_join_all(uploads).await?)
    }

    /// Remove one image's background, normalize to PNG, and store it.
    /// Returns the PNG bytes and the stored public URL.
    async fn remove_and_store(&self, url: &str) -> Result<(Vec<u8>, String), PipelineError> {
        let processed = self.remover.remove(url).await?;
        let png = normalize_to_png(&processed)?;
        let name = format!("{}.png", Uuid::new_v4());
        let processed_url = self
            .storage
            .put(&name, png.clone(), PNG_CONTENT_TYPE)
            .await?;
        Ok((png, processed_url))
    }

    /// Uploads, background removal (sequential, all-or-nothing), and the
    /// archive upload.
    async fn stage_inputs(
        &self,
        job_id: EntityId,
        images: Vec<UploadedImage>,
    ) -> Result<StagedInputs, PipelineError> {
        let uploaded_urls = self.upload_originals(images).await?;

        let mut builder = ZipBuilder::new();
        let mut processed_urls = Vec::with_capacity(uploaded_urls.len());

        for url in &uploaded_urls {
            let (png, processed_url) = self.remove_and_store(url).await?;
            let entry_name = processed_url
                .rsplit('/')
                .next()
                .unwrap_or("image.png")
                .to_string();
            builder.add_file(&entry_name, &png)?;
            processed_urls.push(processed_url);
        }

        let archive_bytes = builder.finish()?;
        let archive_name = format!("training_{job_id}.zip");
        let archive_url = self
            .storage
            .put(&archive_name, archive_bytes, "application/zip")
            .await?;

        Ok(StagedInputs {
            uploaded_urls,
            processed_urls,
            archive_url,
        })
    }

    /// A stage failed before the external service confirmed the
    /// submission: mark the job failed and (for the `Submission` charge
    /// point) give the reservation back. The `is_paid` release makes the
    /// refund single-shot.
    async fn fail_unconfirmed(
        &self,
        job: &TrainingJob,
        error: &PipelineError,
    ) -> Result<(), PipelineError> {
        tracing::error!(job_id = %job.id, error = %error, "Submission failed before confirmation");

        TrainingJobRepo::mark_failed(&self.pool, job.id, &error.to_string()).await?;

        if self.config.credit.charge_point == ChargePoint::Submission {
            Ledger::refund_paid_job(&self.pool, job.id, job.user_id, self.config.credit.job_cost)
                .await?;
        }
        Ok(())
    }
}
