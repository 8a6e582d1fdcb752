use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers::user::{UserState, add_user, delete_user, get_users, update_user};

/// Build the user routes around an already opened store
pub fn create_router(state: UserState) -> Router {
    Router::new()
        .route("/get-users", get(get_users))
        .route("/add-user", post(add_user))
        .route("/update-user/{id}", put(update_user))
        .route("/delete-user/{id}", delete(delete_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
