//! Route definitions for the `/trainings` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use crate::handlers::trainings;
use crate::state::AppState;

/// Request body cap for image batches (50 MiB, matching the frontend's
/// upload limit).
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Routes mounted at `/trainings`.
///
/// ```text
/// GET    /        -> list_trainings
/// POST   /        -> submit_training
/// GET    /{id}    -> get_training (poll + reconcile)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(trainings::list_trainings).post(trainings::submit_training),
        )
        .route("/{id}", get(trainings::get_training))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
