use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;

use crate::db::queries::bookings::*;

pub fn booking_routes() -> Router<PgPool> {
    Router::new()
        .route("/bookings", get(get_bookings))
        .route("/bookings", post(create_booking))
        .route("/bookings/advance", post(advance_bookings))
        .route("/bookings/{booking_id}", put(update_booking))
        .route("/bookings/{booking_id}", delete(delete_booking))
        .route("/bookings/{booking_id}/checkin", patch(checkin_booking))
        .route("/bookings/{booking_id}/checkout", patch(checkout_booking))
        .route("/bookings/{booking_id}/extend", patch(extend_booking))
}
