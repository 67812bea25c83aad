use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use utoipa::OpenApi;

use crate::api::auth::Claims;
use crate::db::models::approval::{
    ApprovalRequest, ApprovalStatus, PendingApproval, PendingApprovalRow, RequestType,
    ResolveApproval,
};
use crate::db::models::booking::BookingStatus;
use crate::error::DomainError;
use crate::time::format_display;
use crate::utils::api_response::ApiResponse;

/// A destructive operation that non-admin staff can only request. Each
/// request type registers one implementation; approving a request runs its
/// `apply` inside the resolving transaction. New deferrable actions plug in
/// here without touching the queue itself.
#[async_trait]
pub trait DeferredAction: Send + Sync {
    fn kind(&self) -> RequestType;

    /// Short human label for the admin queue.
    fn label(&self) -> &'static str;

    /// One-line description of the target entity. An entity that has
    /// already disappeared is described as such, never an error.
    async fn describe(&self, pool: &PgPool, entity_id: i32) -> Result<String, DomainError>;

    /// Performs the deferred operation. A missing entity is a no-op so a
    /// stale request can still be approved and cleared.
    async fn apply(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entity_id: i32,
    ) -> Result<(), DomainError>;
}

pub struct GuestDeleteAction;

#[async_trait]
impl DeferredAction for GuestDeleteAction {
    fn kind(&self) -> RequestType {
        RequestType::GuestDelete
    }

    fn label(&self) -> &'static str {
        "Guest delete request"
    }

    async fn describe(&self, pool: &PgPool, entity_id: i32) -> Result<String, DomainError> {
        let row: Option<(String, i32, Option<String>)> =
            sqlx::query_as("SELECT full_name, age, contact FROM guests WHERE id = $1")
                .bind(entity_id)
                .fetch_optional(pool)
                .await?;

        Ok(match row {
            Some((full_name, age, contact)) => format!(
                "{} • {} yrs • {}",
                full_name,
                age,
                contact.as_deref().unwrap_or("-")
            ),
            None => "Guest record not found".to_string(),
        })
    }

    async fn apply(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entity_id: i32,
    ) -> Result<(), DomainError> {
        cascade_guest_removal(tx, entity_id).await?;
        Ok(())
    }
}

pub struct BookingDeleteAction;

#[async_trait]
impl DeferredAction for BookingDeleteAction {
    fn kind(&self) -> RequestType {
        RequestType::BookingDelete
    }

    fn label(&self) -> &'static str {
        "Booking delete request"
    }

    async fn describe(&self, pool: &PgPool, entity_id: i32) -> Result<String, DomainError> {
        let row: Option<(Option<String>, Option<String>, DateTime<Utc>, DateTime<Utc>)> =
            sqlx::query_as(
                "SELECT g.full_name, r.room_number, b.check_in, b.check_out
                 FROM bookings b
                 LEFT JOIN guests g ON g.id = b.guest_id
                 LEFT JOIN rooms r ON r.id = b.room_id
                 WHERE b.id = $1",
            )
            .bind(entity_id)
            .fetch_optional(pool)
            .await?;

        Ok(match row {
            Some((guest_name, room_number, check_in, check_out)) => format!(
                "{} • Room {} • {} → {}",
                guest_name.as_deref().unwrap_or("Guest"),
                room_number.as_deref().unwrap_or("-"),
                format_display(check_in),
                format_display(check_out),
            ),
            None => "Booking record not found".to_string(),
        })
    }

    async fn apply(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entity_id: i32,
    ) -> Result<(), DomainError> {
        let row: Option<(Option<i32>, BookingStatus)> =
            sqlx::query_as("SELECT room_id, status FROM bookings WHERE id = $1")
                .bind(entity_id)
                .fetch_optional(&mut **tx)
                .await?;
        let Some((room_id, status)) = row else {
            return Ok(());
        };

        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(entity_id)
            .execute(&mut **tx)
            .await?;

        // Only a stay that was actually underway had claimed the room.
        if let Some(room_id) = room_id {
            if status == BookingStatus::CheckedIn {
                sqlx::query("UPDATE rooms SET status = 'vacant' WHERE id = $1")
                    .bind(room_id)
                    .execute(&mut **tx)
                    .await?;
            }
        }
        Ok(())
    }
}

static GUEST_DELETE: GuestDeleteAction = GuestDeleteAction;
static BOOKING_DELETE: BookingDeleteAction = BookingDeleteAction;

/// Registry lookup. The match is exhaustive over [`RequestType`], so a new
/// request kind cannot be added without registering its action.
pub fn action_for(kind: RequestType) -> &'static dyn DeferredAction {
    match kind {
        RequestType::GuestDelete => &GUEST_DELETE,
        RequestType::BookingDelete => &BOOKING_DELETE,
    }
}

/// Terminal status an active booking lands in when its guest is removed:
/// a stay underway is closed out, a reservation is cancelled. Terminal
/// statuses pass through untouched.
fn closed_status(status: BookingStatus) -> BookingStatus {
    match status {
        BookingStatus::CheckedIn => BookingStatus::CheckedOut,
        BookingStatus::Reserved => BookingStatus::Cancelled,
        other => other,
    }
}

/// Rooms to free when a guest's bookings close. Only a stay that was
/// actually underway had claimed its room; a reservation never did.
fn rooms_to_free(active: &[(i32, Option<i32>, BookingStatus)]) -> Vec<i32> {
    active
        .iter()
        .filter(|(_, _, status)| *status == BookingStatus::CheckedIn)
        .filter_map(|(_, room_id, _)| *room_id)
        .collect()
}

/// Closes out a guest's footprint and deletes the row: active stays become
/// checked out, reservations are cancelled, rooms with a stay underway go
/// vacant. Returns false when the guest was already gone.
pub(crate) async fn cascade_guest_removal(
    tx: &mut Transaction<'_, Postgres>,
    guest_id: i32,
) -> Result<bool, DomainError> {
    let active: Vec<(i32, Option<i32>, BookingStatus)> = sqlx::query_as(
        "SELECT id, room_id, status FROM bookings
         WHERE guest_id = $1 AND status IN ('reserved', 'checked_in')",
    )
    .bind(guest_id)
    .fetch_all(&mut **tx)
    .await?;

    for (booking_id, _, status) in &active {
        sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2")
            .bind(closed_status(*status))
            .bind(*booking_id)
            .execute(&mut **tx)
            .await?;
    }

    let freed = rooms_to_free(&active);
    if !freed.is_empty() {
        sqlx::query("UPDATE rooms SET status = 'vacant' WHERE id = ANY($1)")
            .bind(&freed)
            .execute(&mut **tx)
            .await?;
    }

    let deleted = sqlx::query("DELETE FROM guests WHERE id = $1")
        .bind(guest_id)
        .execute(&mut **tx)
        .await?;

    Ok(deleted.rows_affected() > 0)
}

/// Enqueues a deletion request for admin review. Duplicates are allowed;
/// the queue shows every request and resolving one does not touch the rest.
pub(crate) async fn submit_delete_request(
    pool: &PgPool,
    request_type: RequestType,
    entity_id: i32,
    requested_by: i32,
) -> Result<(), DomainError> {
    sqlx::query(
        "INSERT INTO approval_requests (request_type, entity_id, requested_by)
         VALUES ($1, $2, $3)",
    )
    .bind(request_type)
    .bind(entity_id)
    .bind(requested_by)
    .execute(pool)
    .await?;
    Ok(())
}

/// Pending-request count for the sidebar badge.
#[utoipa::path(
    get,
    path = "/approval-count",
    responses(
        (status = 200, description = "Number of pending requests"),
        (status = 401, description = "No valid session")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Approvals"
)]
pub async fn get_approval_count(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<serde_json::Value>, DomainError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM approval_requests WHERE status = 'pending'")
            .fetch_one(&pool)
            .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Pending request count retrieved successfully",
        json!({ "count": count }),
    ))
}

/// Pending requests for the admin queue, newest first, each carrying the
/// requester's name and a description of the target entity.
#[utoipa::path(
    get,
    path = "/approvals",
    responses(
        (status = 200, description = "Pending requests", body = [PendingApproval]),
        (status = 403, description = "Admin access required")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Approvals"
)]
pub async fn get_pending_approvals(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<PendingApproval>>, DomainError> {
    let rows = sqlx::query_as::<_, PendingApprovalRow>(
        "SELECT ar.id, ar.request_type, ar.entity_id, ar.requested_by, ar.status, ar.created_at,
                su.full_name AS requested_by_name
         FROM approval_requests ar
         LEFT JOIN staff_users su ON su.id = ar.requested_by
         WHERE ar.status = 'pending'
         ORDER BY ar.created_at DESC",
    )
    .fetch_all(&pool)
    .await?;

    let mut requests = Vec::with_capacity(rows.len());
    for row in rows {
        let action = action_for(row.request_type);
        let detail = action.describe(&pool, row.entity_id).await?;
        requests.push(PendingApproval {
            id: row.id,
            request_type: row.request_type,
            entity_id: row.entity_id,
            requested_by: row.requested_by,
            requested_by_name: row.requested_by_name,
            status: row.status,
            created_at: row.created_at,
            label: action.label().to_string(),
            detail,
        });
    }

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Pending requests retrieved successfully",
        requests,
    ))
}

/// Approves or rejects a pending request. The row is locked for the
/// duration, so a request resolves exactly once; approval runs the
/// registered action inside the same transaction.
#[utoipa::path(
    patch,
    path = "/approvals/{request_id}",
    params(("request_id" = i32, Path, description = "Approval request ID")),
    request_body = ResolveApproval,
    responses(
        (status = 200, description = "Request resolved", body = ApprovalRequest),
        (status = 400, description = "Request is not pending"),
        (status = 404, description = "Request not found"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Approvals"
)]
pub async fn resolve_approval_request(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(request_id): Path<i32>,
    Json(payload): Json<ResolveApproval>,
) -> Result<ApiResponse<ApprovalRequest>, DomainError> {
    let reviewer_id = claims.user_id()?;
    if payload.status == ApprovalStatus::Pending {
        return Err(DomainError::Validation("Choose approve or reject."));
    }

    let mut tx = pool.begin().await?;

    let request: Option<ApprovalRequest> = sqlx::query_as(
        "SELECT id, request_type, entity_id, requested_by, status, created_at,
                resolved_by, resolved_at
         FROM approval_requests WHERE id = $1 FOR UPDATE",
    )
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(request) = request else {
        return Err(DomainError::NotFound("Request not found."));
    };
    if request.status != ApprovalStatus::Pending {
        return Err(DomainError::Validation("Request is not pending."));
    }

    if payload.status == ApprovalStatus::Approved {
        action_for(request.request_type)
            .apply(&mut tx, request.entity_id)
            .await?;
    }

    let resolved: ApprovalRequest = sqlx::query_as(
        "UPDATE approval_requests SET status = $1, resolved_by = $2, resolved_at = $3
         WHERE id = $4
         RETURNING id, request_type, entity_id, requested_by, status, created_at,
                   resolved_by, resolved_at",
    )
    .bind(payload.status)
    .bind(reviewer_id)
    .bind(Utc::now())
    .bind(request_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let message = match payload.status {
        ApprovalStatus::Approved => "Request approved.",
        _ => "Request rejected.",
    };
    info!(
        "Request {} resolved as {:?} by {}",
        request_id, resolved.status, claims.username
    );
    Ok(ApiResponse::success(StatusCode::OK, message, resolved))
}

#[derive(OpenApi)]
#[openapi(
    paths(get_approval_count, get_pending_approvals, resolve_approval_request),
    components(schemas(ApprovalRequest, PendingApproval, ResolveApproval, RequestType, ApprovalStatus)),
    tags((name = "Approvals", description = "Deferred deletion requests"))
)]
pub struct ApprovalDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_request_type_has_a_registered_action() {
        for kind in [RequestType::GuestDelete, RequestType::BookingDelete] {
            assert_eq!(action_for(kind).kind(), kind);
        }
    }

    #[test]
    fn action_labels_are_distinct() {
        let guest = action_for(RequestType::GuestDelete).label();
        let booking = action_for(RequestType::BookingDelete).label();
        assert_eq!(guest, "Guest delete request");
        assert_eq!(booking, "Booking delete request");
        assert_ne!(guest, booking);
    }

    #[test]
    fn guest_removal_leaves_no_booking_active() {
        assert_eq!(
            closed_status(BookingStatus::CheckedIn),
            BookingStatus::CheckedOut
        );
        assert_eq!(
            closed_status(BookingStatus::Reserved),
            BookingStatus::Cancelled
        );
        for status in [BookingStatus::Reserved, BookingStatus::CheckedIn] {
            assert!(!matches!(
                closed_status(status),
                BookingStatus::Reserved | BookingStatus::CheckedIn
            ));
        }
    }

    #[test]
    fn terminal_statuses_pass_through_the_cascade_unchanged() {
        assert_eq!(
            closed_status(BookingStatus::CheckedOut),
            BookingStatus::CheckedOut
        );
        assert_eq!(
            closed_status(BookingStatus::Cancelled),
            BookingStatus::Cancelled
        );
    }

    #[test]
    fn only_rooms_with_a_stay_underway_are_freed() {
        let active = vec![
            (1, Some(101), BookingStatus::CheckedIn),
            (2, Some(102), BookingStatus::Reserved),
            (3, None, BookingStatus::CheckedIn),
            (4, Some(104), BookingStatus::CheckedIn),
        ];
        assert_eq!(rooms_to_free(&active), vec![101, 104]);
        assert!(rooms_to_free(&[]).is_empty());
    }
}
