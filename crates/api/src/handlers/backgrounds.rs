//! Handler for standalone background removal (no job, no credits).

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

use super::read_multipart;

/// Response payload: one processed URL per uploaded file, in order.
#[derive(Debug, Serialize)]
pub struct ProcessedImages {
    pub processed_urls: Vec<String>,
}

/// POST /api/v1/backgrounds/remove
///
/// Uploads each file, strips its background, normalizes to PNG, and
/// returns the stored public URLs. All-or-nothing across the batch.
pub async fn remove_backgrounds(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (images, _fields) = read_multipart(multipart).await?;

    let processed_urls = state.submission.strip_backgrounds(images).await?;

    Ok(Json(DataResponse {
        data: ProcessedImages { processed_urls },
    }))
}
