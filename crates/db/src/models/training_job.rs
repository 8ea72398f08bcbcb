//! Training job entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelier_core::types::{EntityId, Timestamp};

use super::status::StatusId;

/// A row from the `training_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrainingJob {
    pub id: EntityId,
    pub user_id: EntityId,
    /// Identifier assigned by the training service; NULL until the
    /// external submission completed.
    pub external_id: Option<String>,
    pub status_id: StatusId,
    /// Whether the fixed job cost has been debited for this job.
    pub is_paid: bool,
    /// Trained weights locator; present only once the job succeeded.
    pub artifact_url: Option<String>,
    pub source_image_urls: serde_json::Value,
    pub cover_image_url: Option<String>,
    pub error_message: Option<String>,
    pub progress_percent: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for a freshly submitted job.
#[derive(Debug)]
pub struct CreateTrainingJob {
    pub id: EntityId,
    pub user_id: EntityId,
    pub is_paid: bool,
    pub cover_image_url: Option<String>,
}

/// Query parameters for `GET /trainings`.
#[derive(Debug, Deserialize)]
pub struct TrainingListQuery {
    pub user_id: EntityId,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
