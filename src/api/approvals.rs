use axum::{
    routing::{get, patch},
    Router,
};
use sqlx::PgPool;

use crate::db::queries::approvals::*;

/// The pending-count badge is visible to every signed-in staff member.
pub fn approval_count_routes() -> Router<PgPool> {
    Router::new().route("/approval-count", get(get_approval_count))
}

/// Queue listing and resolution, mounted inside the admin-gated group.
pub fn approval_routes() -> Router<PgPool> {
    Router::new()
        .route("/approvals", get(get_pending_approvals))
        .route("/approvals/{request_id}", patch(resolve_approval_request))
}
