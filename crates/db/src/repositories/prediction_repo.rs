//! Repository for the `predictions` table.
//!
//! Rows are insert-only. Expiry happens in the read path: the handler
//! deletes the requesting user's stale rows before selecting, so no
//! background task is involved.

use sqlx::PgPool;

use atelier_core::types::{EntityId, Timestamp};

use crate::models::prediction::{NewPrediction, Prediction, PredictionListQuery};

/// Column list for `predictions` queries.
const COLUMNS: &str =
    "id, user_id, product_id, image_url, category, source_image_url, created_at";

/// Maximum page size for prediction listing.
const MAX_LIMIT: i64 = 100;

/// Provides insert, sweep, and windowed-read operations for predictions.
pub struct PredictionRepo;

impl PredictionRepo {
    /// Insert one generated image row.
    pub async fn insert(
        pool: &PgPool,
        input: &NewPrediction,
    ) -> Result<Prediction, sqlx::Error> {
        let query = format!(
            "INSERT INTO predictions \
                 (id, user_id, product_id, image_url, category, source_image_url) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prediction>(&query)
            .bind(uuid::Uuid::new_v4())
            .bind(input.user_id)
            .bind(&input.product_id)
            .bind(&input.image_url)
            .bind(&input.category)
            .bind(&input.source_image_url)
            .fetch_one(pool)
            .await
    }

    /// Delete one user's predictions older than `cutoff`. Returns the
    /// number of rows purged.
    pub async fn delete_older_than(
        pool: &PgPool,
        user_id: EntityId,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM predictions WHERE user_id = $1 AND created_at < $2",
        )
        .bind(user_id)
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List one user's predictions created at or after `since`, newest
    /// first, honoring an optional limit (capped) and offset.
    pub async fn list_since(
        pool: &PgPool,
        user_id: EntityId,
        since: Timestamp,
        params: &PredictionListQuery,
    ) -> Result<Vec<Prediction>, sqlx::Error> {
        let limit = params.limit.unwrap_or(MAX_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let query = format!(
            "SELECT {COLUMNS} FROM predictions \
             WHERE user_id = $1 AND created_at >= $2 \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Prediction>(&query)
            .bind(user_id)
            .bind(since)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count a user's predictions for one product (quota accounting).
    pub async fn count_for_product(
        pool: &PgPool,
        user_id: EntityId,
        product_id: &str,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM predictions WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
