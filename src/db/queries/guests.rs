use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use sqlx::PgPool;
use tracing::info;
use utoipa::OpenApi;

use crate::api::auth::Claims;
use crate::db::models::approval::RequestType;
use crate::db::models::guest::{contact_is_valid, Guest, NewGuest, UpdateGuest};
use crate::db::queries::approvals::{cascade_guest_removal, submit_delete_request};
use crate::error::DomainError;
use crate::utils::api_response::ApiResponse;

fn normalized(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Shared validation for create and update. Returns the normalized contact
/// and email, with blanks collapsed to NULL.
fn validate_guest(
    full_name: &str,
    age: i32,
    contact: Option<String>,
    email: Option<String>,
) -> Result<(Option<String>, Option<String>), DomainError> {
    if full_name.trim().is_empty() || age <= 0 {
        return Err(DomainError::Validation("Name and age are required."));
    }
    if age < 18 {
        return Err(DomainError::Age);
    }
    let contact = normalized(contact);
    if let Some(c) = &contact {
        if !contact_is_valid(c) {
            return Err(DomainError::ContactFormat);
        }
    }
    Ok((contact, normalized(email)))
}

#[utoipa::path(
    get,
    path = "/guests",
    responses(
        (status = 200, description = "All guests, newest first", body = [Guest]),
        (status = 401, description = "No valid session")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Guests"
)]
pub async fn get_guests(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<Guest>>, DomainError> {
    let guests = sqlx::query_as::<_, Guest>(
        "SELECT id, full_name, age, contact, email, created_at
         FROM guests ORDER BY created_at DESC",
    )
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Guests retrieved successfully",
        guests,
    ))
}

/// Registers a guest. Adults only; contact, when given, must be a valid
/// mobile number.
#[utoipa::path(
    post,
    path = "/guests",
    request_body = NewGuest,
    responses(
        (status = 201, description = "Guest created", body = Guest),
        (status = 400, description = "Missing fields, underage, or bad contact")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Guests"
)]
pub async fn create_guest(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewGuest>,
) -> Result<ApiResponse<Guest>, DomainError> {
    let (contact, email) =
        validate_guest(&payload.full_name, payload.age, payload.contact, payload.email)?;

    let guest = sqlx::query_as::<_, Guest>(
        "INSERT INTO guests (full_name, age, contact, email)
         VALUES ($1, $2, $3, $4)
         RETURNING id, full_name, age, contact, email, created_at",
    )
    .bind(payload.full_name.trim())
    .bind(payload.age)
    .bind(contact)
    .bind(email)
    .fetch_one(&pool)
    .await?;

    info!("Guest {} added by {}", guest.id, claims.username);
    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Guest added.",
        guest,
    ))
}

#[utoipa::path(
    put,
    path = "/guests/{guest_id}",
    params(("guest_id" = i32, Path, description = "Guest ID")),
    request_body = UpdateGuest,
    responses(
        (status = 200, description = "Guest updated", body = Guest),
        (status = 400, description = "Missing fields, underage, or bad contact"),
        (status = 404, description = "Guest not found")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Guests"
)]
pub async fn update_guest(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(guest_id): Path<i32>,
    Json(payload): Json<UpdateGuest>,
) -> Result<ApiResponse<Guest>, DomainError> {
    let (contact, email) =
        validate_guest(&payload.full_name, payload.age, payload.contact, payload.email)?;

    let guest = sqlx::query_as::<_, Guest>(
        "UPDATE guests SET full_name = $1, age = $2, contact = $3, email = $4
         WHERE id = $5
         RETURNING id, full_name, age, contact, email, created_at",
    )
    .bind(payload.full_name.trim())
    .bind(payload.age)
    .bind(contact)
    .bind(email)
    .bind(guest_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(DomainError::NotFound("Guest not found."))?;

    info!("Guest {} updated by {}", guest.id, claims.username);
    Ok(ApiResponse::success(StatusCode::OK, "Guest updated.", guest))
}

/// Admins delete immediately: active stays are closed out, reservations
/// cancelled, occupied rooms freed, then the guest row goes. Non-admin
/// staff instead enqueue an approval request and get a 202.
#[utoipa::path(
    delete,
    path = "/guests/{guest_id}",
    params(("guest_id" = i32, Path, description = "Guest ID")),
    responses(
        (status = 200, description = "Guest deleted"),
        (status = 202, description = "Delete request sent for approval"),
        (status = 404, description = "Guest not found")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Guests"
)]
pub async fn delete_guest(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(guest_id): Path<i32>,
) -> Result<ApiResponse<()>, DomainError> {
    let staff_id = claims.user_id()?;

    if claims.is_admin() {
        let mut tx = pool.begin().await?;
        let removed = cascade_guest_removal(&mut tx, guest_id).await?;
        if !removed {
            return Err(DomainError::NotFound("Guest not found."));
        }
        tx.commit().await?;

        info!("Guest {} deleted by {}", guest_id, claims.username);
        Ok(ApiResponse::success(StatusCode::OK, "Guest deleted.", ()))
    } else {
        submit_delete_request(&pool, RequestType::GuestDelete, guest_id, staff_id).await?;

        info!(
            "Guest {} delete requested by {}",
            guest_id, claims.username
        );
        Ok(ApiResponse::success(
            StatusCode::ACCEPTED,
            "Delete request sent to admin.",
            (),
        ))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(get_guests, create_guest, update_guest, delete_guest),
    components(schemas(Guest, NewGuest, UpdateGuest)),
    tags((name = "Guests", description = "Guest records"))
)]
pub struct GuestDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optionals_collapse_to_none() {
        assert_eq!(normalized(Some("  ".into())), None);
        assert_eq!(normalized(None), None);
        assert_eq!(
            normalized(Some(" a@b.c ".into())),
            Some("a@b.c".to_string())
        );
    }

    #[test]
    fn missing_name_or_age_wins_over_other_checks() {
        let err = validate_guest("   ", 10, Some("bad".into()), None).unwrap_err();
        assert_eq!(err.code(), "missing");
        let err = validate_guest("Ana Cruz", 0, None, None).unwrap_err();
        assert_eq!(err.code(), "missing");
    }

    #[test]
    fn minors_are_rejected_before_contact_is_checked() {
        let err = validate_guest("Ana Cruz", 17, Some("bad".into()), None).unwrap_err();
        assert_eq!(err.code(), "age");
    }

    #[test]
    fn malformed_contact_is_rejected_but_blank_is_fine() {
        let err = validate_guest("Ana Cruz", 21, Some("12345".into()), None).unwrap_err();
        assert_eq!(err.code(), "contact");
        let (contact, _) = validate_guest("Ana Cruz", 21, Some("  ".into()), None).unwrap();
        assert_eq!(contact, None);
        let (contact, email) = validate_guest(
            "Ana Cruz",
            21,
            Some("09171234567".into()),
            Some("ana@example.com".into()),
        )
        .unwrap();
        assert_eq!(contact.as_deref(), Some("09171234567"));
        assert_eq!(email.as_deref(), Some("ana@example.com"));
    }
}
