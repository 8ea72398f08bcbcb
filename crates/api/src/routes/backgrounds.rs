//! Route definitions for the `/backgrounds` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::backgrounds;
use crate::state::AppState;

/// Request body cap for image batches (50 MiB).
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Routes mounted at `/backgrounds`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/remove", post(backgrounds::remove_backgrounds))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
