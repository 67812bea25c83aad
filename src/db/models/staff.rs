use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Staff,
}

/// Staff account as exposed over the API. The password hash never leaves
/// the database layer.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct StaffUser {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: StaffRole,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Full credential row used only by the login path.
#[derive(Debug, FromRow)]
pub struct StaffCredentials {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: StaffRole,
    pub active: bool,
    pub password_hash: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewStaffUser {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub role: Option<StaffRole>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStaffUser {
    pub username: String,
    pub full_name: String,
    pub role: StaffRole,
    pub active: bool,
}
