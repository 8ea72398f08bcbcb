//! Handlers for the `/users` resource.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use atelier_core::error::CoreError;
use atelier_core::types::EntityId;
use atelier_db::models::user::BalanceResponse;
use atelier_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/{id}/balance
pub async fn get_balance(
    State(state): State<AppState>,
    Path(user_id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    Ok(Json(DataResponse {
        data: BalanceResponse {
            credit_balance: user.credit_balance,
        },
    }))
}
