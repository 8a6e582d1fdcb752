use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::{
    db::user_store::UserStore,
    error::Result,
    handlers::payload::UserPayload,
    models::user::User,
};

pub const USER_ADDED: &str = "User added successfully";
pub const USER_UPDATED: &str = "User updated successfully";
pub const USER_DELETED: &str = "User deleted successfully";

/// State for user handlers
#[derive(Clone)]
pub struct UserState {
    pub user_store: Arc<dyn UserStore>,
}

impl UserState {
    pub fn new(user_store: Arc<dyn UserStore>) -> Self {
        Self { user_store }
    }
}

/// Get all users handler
pub async fn get_users(State(state): State<UserState>) -> Result<Json<Vec<User>>> {
    let users = state.user_store.list_users().await?;
    Ok(Json(users))
}

/// Create user handler. The new id stays server-side.
pub async fn add_user(
    State(state): State<UserState>,
    UserPayload(fields): UserPayload,
) -> Result<impl IntoResponse> {
    state.user_store.add_user(&fields).await?;
    Ok((StatusCode::OK, USER_ADDED))
}

/// Overwrite user handler
pub async fn update_user(
    State(state): State<UserState>,
    Path(id): Path<i64>,
    UserPayload(fields): UserPayload,
) -> Result<impl IntoResponse> {
    let affected = state.user_store.update_user(id, &fields).await?;
    // Zero matched rows still answers with success
    tracing::debug!(id, affected, "user update applied");
    Ok((StatusCode::OK, USER_UPDATED))
}

/// Delete user handler
pub async fn delete_user(
    State(state): State<UserState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let affected = state.user_store.delete_user(id).await?;
    tracing::debug!(id, affected, "user delete applied");
    Ok((StatusCode::OK, USER_DELETED))
}
