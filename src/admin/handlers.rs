use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};

use super::dto::UpdateUserRequest;
use crate::audit;
use crate::auth::dto::PublicUser;
use crate::auth::extractors::CurrentUser;
use crate::entities::{AuditLog, Order, Role, StoredUser};
use crate::error::{ApiError, ApiResult};
use crate::response::{ok, ApiResponse};
use crate::state::AppState;
use crate::store::Entity;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route(
            "/admin/users/:id",
            axum::routing::put(update_user).delete(delete_user),
        )
        .route("/admin/orders", get(list_orders))
        .route("/admin/audit", get(list_audit))
}

/// The admin surface addresses users by id; the store keys them by email.
async fn user_by_id(state: &AppState, id: &str) -> Result<StoredUser, ApiError> {
    state
        .users()
        .list()
        .await?
        .into_iter()
        .find(|u| u.id == id)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

#[instrument(skip(state, current))]
pub async fn list_users(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<PublicUser>>>> {
    current.require(Role::Admin)?;
    let users = state
        .users()
        .list()
        .await?
        .iter()
        .map(PublicUser::from)
        .collect::<Vec<_>>();
    Ok(ok(users))
}

#[instrument(skip(state, current, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<PublicUser>>> {
    let actor = current.require(Role::Admin)?;
    let target = user_by_id(&state, &id).await?;

    let updated = state
        .users()
        .patch(&target.storage_key(), &json!({ "role": payload.role }))
        .await?;

    audit::record(&state, &actor.id, "user.role", "user", &target.id).await;
    info!(user_id = %target.id, role = ?payload.role, actor_id = %actor.id, "user role changed");
    Ok(ok(PublicUser::from(&updated)))
}

#[instrument(skip(state, current))]
pub async fn delete_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let actor = current.require(Role::Admin)?;
    let target = user_by_id(&state, &id).await?;

    if target.id == actor.id {
        return Err(ApiError::conflict("Admins cannot delete their own account"));
    }

    state.users().delete(&target.storage_key()).await?;
    audit::record(&state, &actor.id, "user.delete", "user", &target.id).await;
    info!(user_id = %target.id, actor_id = %actor.id, "user deleted");
    Ok(ok(()))
}

#[instrument(skip(state, current))]
pub async fn list_orders(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<Order>>>> {
    current.require(Role::Admin)?;
    let mut orders = state.orders().list().await?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(ok(orders))
}

#[instrument(skip(state, current))]
pub async fn list_audit(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<ApiResponse<Vec<AuditLog>>>> {
    current.require(Role::Admin)?;
    let mut entries = state.audit().list().await?;
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(ok(entries))
}
