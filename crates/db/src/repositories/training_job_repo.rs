//! Repository for the `training_jobs` table.
//!
//! Status updates carry the transition table as a SQL guard: an update
//! only lands when the current status is allowed to move to the target,
//! so a stale poll can never regress a terminal job.

use sqlx::PgPool;

use atelier_core::types::EntityId;

use crate::models::status::TrainingStatus;
use crate::models::training_job::{CreateTrainingJob, TrainingJob, TrainingListQuery};

/// Column list for `training_jobs` queries.
const COLUMNS: &str = "\
    id, user_id, external_id, status_id, is_paid, artifact_url, \
    source_image_urls, cover_image_url, error_message, progress_percent, \
    created_at, updated_at";

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for training jobs.
pub struct TrainingJobRepo;

impl TrainingJobRepo {
    /// Create a new pending job.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTrainingJob,
    ) -> Result<TrainingJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO training_jobs (id, user_id, status_id, is_paid, cover_image_url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TrainingJob>(&query)
            .bind(input.id)
            .bind(input.user_id)
            .bind(TrainingStatus::Pending.id())
            .bind(input.is_paid)
            .bind(&input.cover_image_url)
            .fetch_one(pool)
            .await
    }

    /// Find a job by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<TrainingJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM training_jobs WHERE id = $1");
        sqlx::query_as::<_, TrainingJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's jobs, newest first, with pagination.
    pub async fn list_by_user(
        pool: &PgPool,
        params: &TrainingListQuery,
    ) -> Result<Vec<TrainingJob>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let query = format!(
            "SELECT {COLUMNS} FROM training_jobs \
             WHERE user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, TrainingJob>(&query)
            .bind(params.user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Record the external submission: the service-assigned ID plus the
    /// processed source image URLs stored on the row.
    pub async fn record_submission(
        pool: &PgPool,
        id: EntityId,
        external_id: &str,
        source_image_urls: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE training_jobs \
             SET external_id = $2, source_image_urls = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(external_id)
        .bind(source_image_urls)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Transition a job's status, honoring the transition table.
    ///
    /// Returns `true` if the row moved (or already held the target
    /// status), `false` if the current status forbids the transition.
    pub async fn transition_status(
        pool: &PgPool,
        id: EntityId,
        next: TrainingStatus,
    ) -> Result<bool, sqlx::Error> {
        let allowed = TrainingStatus::allowed_sources(next);
        let result = sqlx::query(
            "UPDATE training_jobs \
             SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = ANY($3)",
        )
        .bind(id)
        .bind(next.id())
        .bind(&allowed)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a job succeeded with its artifact, forcing progress to 100.
    /// Guarded by the transition table; repeat calls are no-ops that
    /// refresh the artifact URL.
    pub async fn mark_succeeded(
        pool: &PgPool,
        id: EntityId,
        artifact_url: &str,
    ) -> Result<bool, sqlx::Error> {
        let allowed = TrainingStatus::allowed_sources(TrainingStatus::Succeeded);
        let result = sqlx::query(
            "UPDATE training_jobs \
             SET status_id = $2, artifact_url = $3, progress_percent = 100, updated_at = NOW() \
             WHERE id = $1 AND status_id = ANY($4)",
        )
        .bind(id)
        .bind(TrainingStatus::Succeeded.id())
        .bind(artifact_url)
        .bind(&allowed)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a job failed with an error message. Guarded by the transition
    /// table so a succeeded job never flips to failed.
    pub async fn mark_failed(
        pool: &PgPool,
        id: EntityId,
        error: &str,
    ) -> Result<bool, sqlx::Error> {
        let allowed = TrainingStatus::allowed_sources(TrainingStatus::Failed);
        let result = sqlx::query(
            "UPDATE training_jobs \
             SET status_id = $2, error_message = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id = ANY($4)",
        )
        .bind(id)
        .bind(TrainingStatus::Failed.id())
        .bind(error)
        .bind(&allowed)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update the cached progress percentage.
    pub async fn update_progress(
        pool: &PgPool,
        id: EntityId,
        percent: i16,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE training_jobs SET progress_percent = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(percent)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Claim the payment flag for a job.
    ///
    /// Compare-and-set on `is_paid`: returns `true` for exactly one caller
    /// per job, `false` for everyone after. Run inside the settlement
    /// transaction so a failed debit rolls the claim back.
    pub async fn claim_paid<'e, E>(executor: E, id: EntityId) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE training_jobs \
             SET is_paid = TRUE, updated_at = NOW() \
             WHERE id = $1 AND is_paid = FALSE",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Release the payment flag (refund path). Counterpart of
    /// [`claim_paid`](Self::claim_paid); returns `true` for the caller
    /// that actually released it.
    pub async fn release_paid<'e, E>(executor: E, id: EntityId) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE training_jobs \
             SET is_paid = FALSE, updated_at = NOW() \
             WHERE id = $1 AND is_paid = TRUE",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
