use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;

use crate::db::queries::rooms::*;

/// Routes every authenticated staff member can use.
pub fn room_routes() -> Router<PgPool> {
    Router::new().route("/rooms", get(get_rooms))
}

/// Mutating routes, mounted inside the admin-gated group.
pub fn admin_room_routes() -> Router<PgPool> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{room_id}", put(update_room))
        .route("/rooms/{room_id}", delete(delete_room))
        .route("/rooms/{room_id}/status", patch(update_room_status))
}
