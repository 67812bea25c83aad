use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use bcrypt::{hash, DEFAULT_COST};
use sqlx::PgPool;
use tracing::info;
use utoipa::OpenApi;

use crate::api::auth::Claims;
use crate::db::models::staff::{NewStaffUser, StaffRole, StaffUser, UpdateStaffUser};
use crate::error::DomainError;
use crate::utils::api_response::ApiResponse;

#[utoipa::path(
    get,
    path = "/staff",
    responses(
        (status = 200, description = "All staff accounts, newest first", body = [StaffUser]),
        (status = 403, description = "Admin access required")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Staff"
)]
pub async fn get_staff(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<StaffUser>>, DomainError> {
    let accounts = sqlx::query_as::<_, StaffUser>(
        "SELECT id, username, full_name, role, active, created_at
         FROM staff_users ORDER BY created_at DESC",
    )
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Staff accounts retrieved successfully",
        accounts,
    ))
}

/// Creates a staff account. The password is bcrypt-hashed and never stored
/// or returned in the clear; role defaults to staff.
#[utoipa::path(
    post,
    path = "/staff",
    request_body = NewStaffUser,
    responses(
        (status = 201, description = "Account created", body = StaffUser),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Username already exists"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Staff"
)]
pub async fn create_staff(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewStaffUser>,
) -> Result<ApiResponse<StaffUser>, DomainError> {
    let username = payload.username.trim();
    if username.is_empty() || payload.full_name.trim().is_empty() || payload.password.is_empty() {
        return Err(DomainError::Validation("Fill out all fields."));
    }

    let taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM staff_users WHERE username = $1)")
            .bind(username)
            .fetch_one(&pool)
            .await?;
    if taken {
        return Err(DomainError::Duplicate("Username already exists."));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)?;
    let role = payload.role.unwrap_or(StaffRole::Staff);

    let result = sqlx::query_as::<_, StaffUser>(
        "INSERT INTO staff_users (username, full_name, password_hash, role, active)
         VALUES ($1, $2, $3, $4, TRUE)
         RETURNING id, username, full_name, role, active, created_at",
    )
    .bind(username)
    .bind(payload.full_name.trim())
    .bind(password_hash)
    .bind(role)
    .fetch_one(&pool)
    .await;

    match result {
        Ok(account) => {
            info!(
                "Staff account {} created by {}",
                account.username, claims.username
            );
            Ok(ApiResponse::success(
                StatusCode::CREATED,
                "Staff account created.",
                account,
            ))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23505") {
                    return Err(DomainError::Duplicate("Username already exists."));
                }
            }
            Err(e.into())
        }
    }
}

/// Updates name, username, role and the active flag. Passwords are not
/// changed here.
#[utoipa::path(
    put,
    path = "/staff/{staff_id}",
    params(("staff_id" = i32, Path, description = "Staff account ID")),
    request_body = UpdateStaffUser,
    responses(
        (status = 200, description = "Account updated", body = StaffUser),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Username already exists")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Staff"
)]
pub async fn update_staff(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(staff_id): Path<i32>,
    Json(payload): Json<UpdateStaffUser>,
) -> Result<ApiResponse<StaffUser>, DomainError> {
    let username = payload.username.trim();
    if username.is_empty() || payload.full_name.trim().is_empty() {
        return Err(DomainError::Validation("Fill out all fields."));
    }

    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM staff_users WHERE username = $1 AND id <> $2)",
    )
    .bind(username)
    .bind(staff_id)
    .fetch_one(&pool)
    .await?;
    if taken {
        return Err(DomainError::Duplicate("Username already exists."));
    }

    let result = sqlx::query_as::<_, StaffUser>(
        "UPDATE staff_users SET username = $1, full_name = $2, role = $3, active = $4
         WHERE id = $5
         RETURNING id, username, full_name, role, active, created_at",
    )
    .bind(username)
    .bind(payload.full_name.trim())
    .bind(payload.role)
    .bind(payload.active)
    .bind(staff_id)
    .fetch_optional(&pool)
    .await;

    match result {
        Ok(Some(account)) => {
            info!(
                "Staff account {} updated by {}",
                account.username, claims.username
            );
            Ok(ApiResponse::success(
                StatusCode::OK,
                "Staff account updated.",
                account,
            ))
        }
        Ok(None) => Err(DomainError::NotFound("Staff account not found.")),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23505") {
                    return Err(DomainError::Duplicate("Username already exists."));
                }
            }
            Err(e.into())
        }
    }
}

/// Deletes a staff account. Admins cannot delete themselves, which keeps
/// at least the acting admin alive.
#[utoipa::path(
    delete,
    path = "/staff/{staff_id}",
    params(("staff_id" = i32, Path, description = "Staff account ID")),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 400, description = "Cannot delete own account"),
        (status = 404, description = "Account not found")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Staff"
)]
pub async fn delete_staff(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(staff_id): Path<i32>,
) -> Result<ApiResponse<()>, DomainError> {
    if claims.user_id()? == staff_id {
        return Err(DomainError::SelfDelete);
    }

    let result = sqlx::query("DELETE FROM staff_users WHERE id = $1")
        .bind(staff_id)
        .execute(&pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DomainError::NotFound("Staff account not found."));
    }

    info!("Staff account {} deleted by {}", staff_id, claims.username);
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Staff account deleted.",
        (),
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(get_staff, create_staff, update_staff, delete_staff),
    components(schemas(StaffUser, NewStaffUser, UpdateStaffUser, StaffRole)),
    tags((name = "Staff", description = "Staff account administration"))
)]
pub struct StaffDoc;
