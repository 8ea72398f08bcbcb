//! Route definitions for the `/predictions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::predictions;
use crate::state::AppState;

/// Routes mounted at `/predictions`.
///
/// ```text
/// POST   /            -> generate_predictions
/// GET    /{user_id}   -> list_predictions (sweeps expired rows first)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(predictions::generate_predictions))
        .route("/{user_id}", get(predictions::list_predictions))
}
