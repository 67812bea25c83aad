use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;

use crate::db::queries::guests::*;

pub fn guest_routes() -> Router<PgPool> {
    Router::new()
        .route("/guests", get(get_guests))
        .route("/guests", post(create_guest))
        .route("/guests/{guest_id}", put(update_guest))
        .route("/guests/{guest_id}", delete(delete_guest))
}
