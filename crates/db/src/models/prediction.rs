//! Prediction (generated image) entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atelier_core::types::{EntityId, Timestamp};

/// A row from the `predictions` table. Rows are insert-only and expire
/// via the read-triggered retention sweep.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prediction {
    pub id: EntityId,
    pub user_id: EntityId,
    pub product_id: String,
    pub image_url: String,
    pub category: String,
    pub source_image_url: Option<String>,
    pub created_at: Timestamp,
}

/// Insert payload for one generated image.
#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub user_id: EntityId,
    pub product_id: String,
    pub image_url: String,
    pub category: String,
    pub source_image_url: Option<String>,
}

/// Query parameters for `GET /predictions/{user_id}`.
#[derive(Debug, Deserialize)]
pub struct PredictionListQuery {
    /// Maximum number of results. Must be positive; capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
