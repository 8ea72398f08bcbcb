//! Handlers for the `/predictions` resource: on-demand generation and
//! the retention-swept listing.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use atelier_core::category::ProductCategory;
use atelier_core::types::EntityId;
use atelier_db::models::prediction::PredictionListQuery;
use atelier_db::repositories::PredictionRepo;
use atelier_pipeline::generation::GenerationRequest;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn default_image_count() -> u32 {
    1
}

fn default_aspect_ratio() -> String {
    "1:1".to_string()
}

fn default_output_format() -> String {
    "png".to_string()
}

/// JSON body for `POST /predictions`.
#[derive(Debug, Deserialize)]
pub struct GeneratePredictions {
    pub user_id: EntityId,
    pub product_id: String,
    pub category: ProductCategory,
    pub prompt: Option<String>,
    pub custom_prompt: Option<String>,
    pub extra_detail: Option<String>,
    /// Product reference image shown to the text-generation service.
    pub reference_image_url: Option<String>,
    /// Extra style adapters merged onto the category defaults.
    #[serde(default)]
    pub style_adapters: Vec<String>,
    #[serde(default = "default_image_count")]
    pub image_count: u32,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

/// POST /api/v1/predictions
///
/// Runs the full generation flow and returns the persisted rows, one
/// per synthesized image.
pub async fn generate_predictions(
    State(state): State<AppState>,
    Json(body): Json<GeneratePredictions>,
) -> AppResult<impl IntoResponse> {
    let request = GenerationRequest {
        user_id: body.user_id,
        product_id: body.product_id,
        category: body.category,
        prompt: body.prompt,
        custom_prompt: body.custom_prompt,
        extra_detail: body.extra_detail,
        reference_image_url: body.reference_image_url,
        style_adapters: body.style_adapters,
        image_count: body.image_count,
        aspect_ratio: body.aspect_ratio,
        output_format: body.output_format,
    };

    let saved = state.generation.generate(request).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: saved })))
}

/// GET /api/v1/predictions/{user_id}?limit=&offset=
///
/// Sweeps the requesting user's expired rows, then returns rows within
/// the display window, newest first.
pub async fn list_predictions(
    State(state): State<AppState>,
    Path(user_id): Path<EntityId>,
    Query(params): Query<PredictionListQuery>,
) -> AppResult<impl IntoResponse> {
    if let Some(limit) = params.limit {
        if limit <= 0 {
            return Err(AppError::BadRequest(
                "limit must be a positive integer".to_string(),
            ));
        }
    }

    let retention = &state.pipeline_config.retention;
    let now = Utc::now();

    let purged =
        PredictionRepo::delete_older_than(&state.pool, user_id, now - retention.purge).await?;
    if purged > 0 {
        tracing::debug!(%user_id, purged, "Retention sweep removed expired predictions");
    }

    let rows =
        PredictionRepo::list_since(&state.pool, user_id, now - retention.display, &params).await?;

    Ok(Json(DataResponse { data: rows }))
}
