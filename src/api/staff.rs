use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;

use crate::db::queries::staff::*;

pub fn staff_routes() -> Router<PgPool> {
    Router::new()
        .route("/staff", get(get_staff))
        .route("/staff", post(create_staff))
        .route("/staff/{staff_id}", put(update_staff))
        .route("/staff/{staff_id}", delete(delete_staff))
}
