//! Handlers for the `/trainings` resource: submission, status polling,
//! and per-user listing.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use atelier_core::types::{EntityId, Timestamp};
use atelier_db::models::status::TrainingStatus;
use atelier_db::models::training_job::{TrainingJob, TrainingListQuery};
use atelier_db::repositories::TrainingJobRepo;
use atelier_pipeline::submission::SubmissionRequest;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

use super::read_multipart;

/// Client-facing view of a training job: status as a name, progress as
/// observed by the most recent poll.
#[derive(Debug, Serialize)]
pub struct TrainingJobView {
    pub id: EntityId,
    pub user_id: EntityId,
    pub external_id: Option<String>,
    pub status: &'static str,
    pub progress_percent: i16,
    pub is_paid: bool,
    pub artifact_url: Option<String>,
    pub source_image_urls: serde_json::Value,
    pub cover_image_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TrainingJobView {
    fn build(job: TrainingJob, progress_percent: i16) -> AppResult<Self> {
        let status = TrainingStatus::from_id(job.status_id).map_err(AppError::Core)?;
        Ok(Self {
            id: job.id,
            user_id: job.user_id,
            external_id: job.external_id,
            status: status.name(),
            progress_percent,
            is_paid: job.is_paid,
            artifact_url: job.artifact_url,
            source_image_urls: job.source_image_urls,
            cover_image_url: job.cover_image_url,
            error_message: job.error_message,
            created_at: job.created_at,
            updated_at: job.updated_at,
        })
    }

    fn from_row(job: TrainingJob) -> AppResult<Self> {
        let progress = job.progress_percent;
        Self::build(job, progress)
    }
}

/// Submission response: the job plus everything the pipeline stored.
#[derive(Debug, Serialize)]
pub struct SubmissionView {
    pub job: TrainingJobView,
    pub uploaded_urls: Vec<String>,
    pub processed_urls: Vec<String>,
    pub archive_url: String,
}

/// POST /api/v1/trainings
///
/// Multipart submission: repeated `files` parts plus `user_id`, optional
/// `cover_image_url` and `product_kind` text fields. Returns 201 with
/// the pending job.
pub async fn submit_training(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (images, fields) = read_multipart(multipart).await?;

    let user_id: Uuid = fields
        .get("user_id")
        .ok_or_else(|| AppError::BadRequest("user_id is required".to_string()))?
        .parse()
        .map_err(|_| AppError::BadRequest("user_id must be a UUID".to_string()))?;

    let request = SubmissionRequest {
        user_id,
        images,
        cover_image_url: fields.get("cover_image_url").cloned(),
        product_kind: fields.get("product_kind").cloned(),
    };

    let outcome = state.submission.submit(request).await?;

    tracing::info!(job_id = %outcome.job.id, %user_id, "Training job submitted");

    let view = SubmissionView {
        uploaded_urls: outcome.uploaded_urls,
        processed_urls: outcome.processed_urls,
        archive_url: outcome.archive_url,
        job: TrainingJobView::from_row(outcome.job)?,
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/trainings/{id}
///
/// Polls the external service and reconciles local state. Degrades to
/// the last known state when the service is unreachable, so polling
/// clients never see a hard failure for a transient outage.
pub async fn get_training(
    State(state): State<AppState>,
    Path(job_id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.poller.poll(job_id).await?;
    let view = TrainingJobView::build(outcome.job, outcome.progress_percent)?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/trainings?user_id=
///
/// List a user's jobs from local rows (no remote calls), newest first.
pub async fn list_trainings(
    State(state): State<AppState>,
    Query(params): Query<TrainingListQuery>,
) -> AppResult<impl IntoResponse> {
    let jobs = TrainingJobRepo::list_by_user(&state.pool, &params).await?;
    let views = jobs
        .into_iter()
        .map(TrainingJobView::from_row)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(Json(DataResponse { data: views }))
}
