//! Route definitions, one module per resource.

pub mod backgrounds;
pub mod health;
pub mod predictions;
pub mod trainings;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/trainings", trainings::router())
        .nest("/predictions", predictions::router())
        .nest("/users", users::router())
        .nest("/backgrounds", backgrounds::router())
}
