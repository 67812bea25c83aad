use axum::{routing::get, Router};
use sqlx::PgPool;

use crate::db::queries::availability::*;

pub fn availability_routes() -> Router<PgPool> {
    Router::new().route("/available-rooms", get(get_available_rooms))
}
