use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Deletion kinds a non-admin can request. Each tag has a registered
/// deferred action that applies it on approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RequestType {
    GuestDelete,
    BookingDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ApprovalRequest {
    pub id: i32,
    pub request_type: RequestType,
    pub entity_id: i32,
    pub requested_by: Option<i32>,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_by: Option<i32>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Pending request joined with the requester's display name.
#[derive(Debug, FromRow)]
pub struct PendingApprovalRow {
    pub id: i32,
    pub request_type: RequestType,
    pub entity_id: i32,
    pub requested_by: Option<i32>,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub requested_by_name: Option<String>,
}

/// Pending request as shown in the admin queue: the row plus a label for
/// the request kind and a one-line description of the target entity.
#[derive(Debug, Serialize, ToSchema)]
pub struct PendingApproval {
    pub id: i32,
    pub request_type: RequestType,
    pub entity_id: i32,
    pub requested_by: Option<i32>,
    pub requested_by_name: Option<String>,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub label: String,
    pub detail: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveApproval {
    pub status: ApprovalStatus,
}
