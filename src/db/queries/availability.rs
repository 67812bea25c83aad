use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use utoipa::{IntoParams, OpenApi};

use crate::db::models::room::{compare_room_numbers, Room};
use crate::error::DomainError;
use crate::time::{add_hours, parse_local};
use crate::utils::api_response::ApiResponse;

/// Raw query parameters. Kept as strings so a malformed number surfaces as
/// the domain's own failure rather than an extractor rejection.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityParams {
    /// Local check-in time, `YYYY-MM-DDTHH:MM`
    pub check_in: Option<String>,
    pub stay_hours: Option<String>,
    pub pax: Option<String>,
}

fn parse_positive(raw: &str) -> Option<i32> {
    raw.trim().parse().ok().filter(|n| *n > 0)
}

/// Rooms bookable for the window `[check_in, check_in + stay_hours)`:
/// not under maintenance, big enough for the party, and free of active
/// bookings that overlap the window.
#[utoipa::path(
    get,
    path = "/available-rooms",
    params(AvailabilityParams),
    responses(
        (status = 200, description = "Rooms free for the window"),
        (status = 400, description = "Missing or invalid parameters"),
        (status = 401, description = "No valid session")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Availability"
)]
pub async fn get_available_rooms(
    State(pool): State<PgPool>,
    Query(params): Query<AvailabilityParams>,
) -> Result<ApiResponse<serde_json::Value>, DomainError> {
    let (Some(check_in_raw), Some(stay_raw), Some(pax_raw)) =
        (params.check_in, params.stay_hours, params.pax)
    else {
        return Err(DomainError::Validation("Missing dates."));
    };

    let check_in = parse_local(&check_in_raw).ok_or(DomainError::Parse("Invalid dates."))?;
    let stay_hours = parse_positive(&stay_raw).ok_or(DomainError::Parse("Invalid dates."))?;
    let pax = parse_positive(&pax_raw).ok_or(DomainError::Parse("Invalid dates."))?;
    let check_out = add_hours(check_in, stay_hours as i64);

    let mut rooms = sqlx::query_as::<_, Room>(
        "SELECT id, room_number, room_type, capacity, status, created_at
         FROM rooms
         WHERE status <> 'maintenance'
           AND capacity >= $1
           AND id NOT IN (
               SELECT room_id FROM bookings
               WHERE room_id IS NOT NULL
                 AND status IN ('reserved', 'checked_in')
                 AND check_in < $2
                 AND check_out > $3)",
    )
    .bind(pax)
    .bind(check_out)
    .bind(check_in)
    .fetch_all(&pool)
    .await?;

    rooms.sort_by(|a, b| compare_room_numbers(&a.room_number, &b.room_number));

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Available rooms retrieved successfully",
        json!({ "rooms": rooms }),
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(get_available_rooms),
    components(schemas(Room)),
    tags((name = "Availability", description = "Room availability lookup"))
)]
pub struct AvailabilityDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_integers_parse() {
        assert_eq!(parse_positive("5"), Some(5));
        assert_eq!(parse_positive(" 8 "), Some(8));
    }

    #[test]
    fn zero_negative_and_garbage_do_not() {
        assert_eq!(parse_positive("0"), None);
        assert_eq!(parse_positive("-2"), None);
        assert_eq!(parse_positive("abc"), None);
        assert_eq!(parse_positive("3.5"), None);
        assert_eq!(parse_positive(""), None);
    }
}
