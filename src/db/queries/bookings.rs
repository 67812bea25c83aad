use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use utoipa::{IntoParams, OpenApi};

use crate::api::auth::Claims;
use crate::db::models::approval::RequestType;
use crate::db::models::booking::{
    is_allowed_stay, Booking, BookingStatus, BookingSummary, ExtendBooking, NewBooking,
    StatusChange, UpdateBooking,
};
use crate::db::queries::approvals::submit_delete_request;
use crate::error::DomainError;
use crate::time::{add_hours, parse_local};
use crate::utils::api_response::ApiResponse;

/// Field-level validation shared by create and update. Returns the parsed
/// check-in instant.
fn validate_stay_fields(
    guest_id: i32,
    room_id: i32,
    check_in: &str,
    stay_hours: i32,
    pax: i32,
) -> Result<DateTime<Utc>, DomainError> {
    if guest_id <= 0
        || room_id <= 0
        || check_in.trim().is_empty()
        || pax <= 0
        || !is_allowed_stay(stay_hours)
    {
        return Err(DomainError::Validation("Fill out all fields."));
    }
    parse_local(check_in).ok_or(DomainError::Parse("Invalid check-in date."))
}

/// A stay that begins now or in the past starts checked in; a future one is
/// a reservation.
fn initial_status(check_in: DateTime<Utc>, now: DateTime<Utc>) -> BookingStatus {
    if check_in <= now {
        BookingStatus::CheckedIn
    } else {
        BookingStatus::Reserved
    }
}

fn valid_extend_hours(hours: i32) -> bool {
    (1..=24).contains(&hours)
}

/// Half-open overlap test: an existing stay collides with the window when
/// it starts before the window ends and ends after the window starts.
/// Back-to-back stays touching at the boundary do not collide.
fn windows_overlap(
    existing_in: DateTime<Utc>,
    existing_out: DateTime<Utc>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> bool {
    existing_in < window_end && existing_out > window_start
}

fn check_capacity(pax: i32, capacity: i32) -> Result<(), DomainError> {
    if pax > capacity {
        return Err(DomainError::Capacity);
    }
    Ok(())
}

/// Serializes all booking writes for one room. The key is the room id, so
/// two concurrent requests against the same room queue up while different
/// rooms proceed in parallel.
async fn lock_room(tx: &mut Transaction<'_, Postgres>, room_id: i32) -> Result<(), DomainError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(room_id as i64)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn room_capacity(
    tx: &mut Transaction<'_, Postgres>,
    room_id: i32,
) -> Result<i32, DomainError> {
    sqlx::query_scalar("SELECT capacity FROM rooms WHERE id = $1")
        .bind(room_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DomainError::NotFound("Room not found."))
}

async fn ensure_guest_exists(
    tx: &mut Transaction<'_, Postgres>,
    guest_id: i32,
) -> Result<(), DomainError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM guests WHERE id = $1)")
        .bind(guest_id)
        .fetch_one(&mut **tx)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(DomainError::NotFound("Guest not found."))
    }
}

/// True when any active booking on the room overlaps the window. The
/// interval test runs in Rust over the room's active stays; the set per
/// room is small, and the surrounding advisory lock keeps it stable.
async fn room_has_conflict(
    tx: &mut Transaction<'_, Postgres>,
    room_id: i32,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    exclude_booking: Option<i32>,
) -> Result<bool, DomainError> {
    let active: Vec<(DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
        "SELECT check_in, check_out FROM bookings
         WHERE room_id = $1
           AND status IN ('reserved', 'checked_in')
           AND id <> COALESCE($2, -1)",
    )
    .bind(room_id)
    .bind(exclude_booking)
    .fetch_all(&mut **tx)
    .await?;

    Ok(active.into_iter().any(|(check_in, check_out)| {
        windows_overlap(check_in, check_out, window_start, window_end)
    }))
}

/// Promotes every reservation whose check-in has arrived to checked in and
/// occupies its room. Returns the number promoted.
pub(crate) async fn advance_due_reservations(pool: &PgPool) -> Result<u64, DomainError> {
    let mut tx = pool.begin().await?;

    let room_ids: Vec<Option<i32>> = sqlx::query_scalar(
        "UPDATE bookings SET status = 'checked_in'
         WHERE status = 'reserved' AND check_in <= $1
         RETURNING room_id",
    )
    .bind(Utc::now())
    .fetch_all(&mut *tx)
    .await?;

    let promoted = room_ids.len() as u64;
    let rooms: Vec<i32> = room_ids.into_iter().flatten().collect();
    if !rooms.is_empty() {
        sqlx::query("UPDATE rooms SET status = 'occupied' WHERE id = ANY($1)")
            .bind(&rooms)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(promoted)
}

/// Lists bookings newest check-in first, after promoting any reservation
/// that has come due, so the console never shows a stale `reserved` row.
#[utoipa::path(
    get,
    path = "/bookings",
    responses(
        (status = 200, description = "All bookings with joined names", body = [BookingSummary]),
        (status = 401, description = "No valid session")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Bookings"
)]
pub async fn get_bookings(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<BookingSummary>>, DomainError> {
    advance_due_reservations(&pool).await?;

    let bookings = sqlx::query_as::<_, BookingSummary>(
        "SELECT b.id, b.guest_id, b.room_id, b.check_in, b.check_out, b.stay_hours, b.pax,
                b.status, b.created_at,
                g.full_name AS guest_name, r.room_number AS room_number
         FROM bookings b
         LEFT JOIN guests g ON g.id = b.guest_id
         LEFT JOIN rooms r ON r.id = b.room_id
         ORDER BY b.check_in DESC",
    )
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Bookings retrieved successfully",
        bookings,
    ))
}

/// Explicit promotion pass, for clients that want the state machine nudged
/// without fetching the list.
#[utoipa::path(
    post,
    path = "/bookings/advance",
    responses(
        (status = 200, description = "Due reservations promoted"),
        (status = 401, description = "No valid session")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Bookings"
)]
pub async fn advance_bookings(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<serde_json::Value>, DomainError> {
    let promoted = advance_due_reservations(&pool).await?;
    if promoted > 0 {
        info!("{promoted} reservation(s) advanced to checked in");
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Due reservations advanced.",
        json!({ "promoted": promoted }),
    ))
}

/// Books a room. The conflict check and the insert run in one transaction
/// under a per-room advisory lock, so two overlapping requests for the same
/// room cannot both pass the check.
#[utoipa::path(
    post,
    path = "/bookings",
    request_body = NewBooking,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 400, description = "Missing fields, bad date, past check-in, or pax over capacity"),
        (status = 404, description = "Room or guest not found"),
        (status = 409, description = "Room is not available for those dates")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Bookings"
)]
pub async fn create_booking(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewBooking>,
) -> Result<ApiResponse<Booking>, DomainError> {
    let check_in = validate_stay_fields(
        payload.guest_id,
        payload.room_id,
        &payload.check_in,
        payload.stay_hours,
        payload.pax,
    )?;
    let now = Utc::now();
    if check_in < now {
        return Err(DomainError::PastDate);
    }
    let check_out = add_hours(check_in, payload.stay_hours as i64);

    let mut tx = pool.begin().await?;
    lock_room(&mut tx, payload.room_id).await?;

    let capacity = room_capacity(&mut tx, payload.room_id).await?;
    check_capacity(payload.pax, capacity)?;
    ensure_guest_exists(&mut tx, payload.guest_id).await?;

    if room_has_conflict(&mut tx, payload.room_id, check_in, check_out, None).await? {
        return Err(DomainError::Conflict);
    }

    let status = initial_status(check_in, now);
    let booking = sqlx::query_as::<_, Booking>(
        "INSERT INTO bookings (guest_id, room_id, check_in, check_out, stay_hours, pax, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id, guest_id, room_id, check_in, check_out, stay_hours, pax, status, created_at",
    )
    .bind(payload.guest_id)
    .bind(payload.room_id)
    .bind(check_in)
    .bind(check_out)
    .bind(payload.stay_hours)
    .bind(payload.pax)
    .bind(status)
    .fetch_one(&mut *tx)
    .await?;

    if status == BookingStatus::CheckedIn {
        sqlx::query("UPDATE rooms SET status = 'occupied' WHERE id = $1")
            .bind(payload.room_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!("Booking {} created by {}", booking.id, claims.username);
    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Booking created.",
        booking,
    ))
}

/// Rewrites a booking's stay fields. Status and room state are never
/// touched here, and a check-in that has meanwhile slipped into the past is
/// accepted as-is.
#[utoipa::path(
    put,
    path = "/bookings/{booking_id}",
    params(("booking_id" = i32, Path, description = "Booking ID")),
    request_body = UpdateBooking,
    responses(
        (status = 200, description = "Booking updated", body = Booking),
        (status = 400, description = "Missing fields, bad date, or pax over capacity"),
        (status = 404, description = "Booking, room, or guest not found"),
        (status = 409, description = "Room is not available for those dates")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Bookings"
)]
pub async fn update_booking(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i32>,
    Json(payload): Json<UpdateBooking>,
) -> Result<ApiResponse<Booking>, DomainError> {
    let check_in = validate_stay_fields(
        payload.guest_id,
        payload.room_id,
        &payload.check_in,
        payload.stay_hours,
        payload.pax,
    )?;
    let check_out = add_hours(check_in, payload.stay_hours as i64);

    let mut tx = pool.begin().await?;
    lock_room(&mut tx, payload.room_id).await?;

    let capacity = room_capacity(&mut tx, payload.room_id).await?;
    check_capacity(payload.pax, capacity)?;
    ensure_guest_exists(&mut tx, payload.guest_id).await?;

    if room_has_conflict(&mut tx, payload.room_id, check_in, check_out, Some(booking_id)).await? {
        return Err(DomainError::Conflict);
    }

    let booking = sqlx::query_as::<_, Booking>(
        "UPDATE bookings
         SET guest_id = $1, room_id = $2, check_in = $3, check_out = $4, stay_hours = $5, pax = $6
         WHERE id = $7
         RETURNING id, guest_id, room_id, check_in, check_out, stay_hours, pax, status, created_at",
    )
    .bind(payload.guest_id)
    .bind(payload.room_id)
    .bind(check_in)
    .bind(check_out)
    .bind(payload.stay_hours)
    .bind(payload.pax)
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DomainError::NotFound("Booking not found."))?;

    tx.commit().await?;

    info!("Booking {} updated by {}", booking.id, claims.username);
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Booking updated.",
        booking,
    ))
}

/// Front-desk check-in. Re-anchors the stay at the current moment for its
/// full length and occupies the room; no conflict check, the desk decision
/// wins.
#[utoipa::path(
    patch,
    path = "/bookings/{booking_id}/checkin",
    params(("booking_id" = i32, Path, description = "Booking ID")),
    request_body = StatusChange,
    responses(
        (status = 200, description = "Guest checked in", body = Booking),
        (status = 404, description = "Booking not found")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Bookings"
)]
pub async fn checkin_booking(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i32>,
    Json(payload): Json<StatusChange>,
) -> Result<ApiResponse<Booking>, DomainError> {
    let mut tx = pool.begin().await?;

    let row: Option<(i32, Option<i32>)> =
        sqlx::query_as("SELECT stay_hours, room_id FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some((stay_hours, room_id)) = row else {
        return Err(DomainError::NotFound("Booking not found."));
    };

    let now = Utc::now();
    let check_out = add_hours(now, stay_hours as i64);
    let booking = sqlx::query_as::<_, Booking>(
        "UPDATE bookings SET status = 'checked_in', check_in = $1, check_out = $2
         WHERE id = $3
         RETURNING id, guest_id, room_id, check_in, check_out, stay_hours, pax, status, created_at",
    )
    .bind(now)
    .bind(check_out)
    .bind(booking_id)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(room_id) = payload.room_id.or(room_id) {
        sqlx::query("UPDATE rooms SET status = 'occupied' WHERE id = $1")
            .bind(room_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!("Booking {} checked in by {}", booking_id, claims.username);
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Booking updated.",
        booking,
    ))
}

/// Unconditional checkout: the stay ends and the room goes vacant whatever
/// state the booking was in.
#[utoipa::path(
    patch,
    path = "/bookings/{booking_id}/checkout",
    params(("booking_id" = i32, Path, description = "Booking ID")),
    request_body = StatusChange,
    responses(
        (status = 200, description = "Guest checked out", body = Booking),
        (status = 404, description = "Booking not found")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Bookings"
)]
pub async fn checkout_booking(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i32>,
    Json(payload): Json<StatusChange>,
) -> Result<ApiResponse<Booking>, DomainError> {
    let mut tx = pool.begin().await?;

    let row: Option<Option<i32>> = sqlx::query_scalar("SELECT room_id FROM bookings WHERE id = $1")
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(room_id) = row else {
        return Err(DomainError::NotFound("Booking not found."));
    };

    let booking = sqlx::query_as::<_, Booking>(
        "UPDATE bookings SET status = 'checked_out' WHERE id = $1
         RETURNING id, guest_id, room_id, check_in, check_out, stay_hours, pax, status, created_at",
    )
    .bind(booking_id)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(room_id) = payload.room_id.or(room_id) {
        sqlx::query("UPDATE rooms SET status = 'vacant' WHERE id = $1")
            .bind(room_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!("Booking {} checked out by {}", booking_id, claims.username);
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Booking updated.",
        booking,
    ))
}

/// Extends a stay by 1 to 24 hours. Only the tail window is conflict
/// checked, so the extension fails only if it would run into the next
/// booking on the room.
#[utoipa::path(
    patch,
    path = "/bookings/{booking_id}/extend",
    params(("booking_id" = i32, Path, description = "Booking ID")),
    request_body = ExtendBooking,
    responses(
        (status = 200, description = "Stay extended", body = Booking),
        (status = 400, description = "Extension hours out of range"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Extension collides with the next booking")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Bookings"
)]
pub async fn extend_booking(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i32>,
    Json(payload): Json<ExtendBooking>,
) -> Result<ApiResponse<Booking>, DomainError> {
    if !valid_extend_hours(payload.extend_hours) {
        return Err(DomainError::Validation("Fill out all fields."));
    }

    let mut tx = pool.begin().await?;

    let row: Option<(DateTime<Utc>, Option<i32>)> =
        sqlx::query_as("SELECT check_out, room_id FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some((current_check_out, room_id)) = row else {
        return Err(DomainError::NotFound("Booking not found."));
    };

    let new_check_out = add_hours(current_check_out, payload.extend_hours as i64);
    if let Some(room_id) = payload.room_id.or(room_id) {
        lock_room(&mut tx, room_id).await?;
        if room_has_conflict(
            &mut tx,
            room_id,
            current_check_out,
            new_check_out,
            Some(booking_id),
        )
        .await?
        {
            return Err(DomainError::Conflict);
        }
    }

    let booking = sqlx::query_as::<_, Booking>(
        "UPDATE bookings SET check_out = $1, stay_hours = stay_hours + $2 WHERE id = $3
         RETURNING id, guest_id, room_id, check_in, check_out, stay_hours, pax, status, created_at",
    )
    .bind(new_check_out)
    .bind(payload.extend_hours)
    .bind(booking_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Booking {} extended {}h by {}",
        booking_id, payload.extend_hours, claims.username
    );
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Booking updated.",
        booking,
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteBookingParams {
    /// Room to free, defaults to the booking's own room.
    pub room_id: Option<i32>,
}

/// Admins delete outright and the room goes vacant; non-admin staff
/// enqueue a deletion request instead.
#[utoipa::path(
    delete,
    path = "/bookings/{booking_id}",
    params(
        ("booking_id" = i32, Path, description = "Booking ID"),
        DeleteBookingParams
    ),
    responses(
        (status = 200, description = "Booking deleted"),
        (status = 202, description = "Delete request sent for approval"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Bookings"
)]
pub async fn delete_booking(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i32>,
    Query(params): Query<DeleteBookingParams>,
) -> Result<ApiResponse<()>, DomainError> {
    let staff_id = claims.user_id()?;

    if claims.is_admin() {
        let mut tx = pool.begin().await?;

        let row: Option<Option<i32>> =
            sqlx::query_scalar("SELECT room_id FROM bookings WHERE id = $1")
                .bind(booking_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(room_id) = row else {
            return Err(DomainError::NotFound("Booking not found."));
        };

        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id)
            .execute(&mut *tx)
            .await?;

        if let Some(room_id) = params.room_id.or(room_id) {
            sqlx::query("UPDATE rooms SET status = 'vacant' WHERE id = $1")
                .bind(room_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!("Booking {} deleted by {}", booking_id, claims.username);
        Ok(ApiResponse::success(StatusCode::OK, "Booking deleted.", ()))
    } else {
        submit_delete_request(&pool, RequestType::BookingDelete, booking_id, staff_id).await?;

        info!(
            "Booking {} delete requested by {}",
            booking_id, claims.username
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
    paths(
        get_bookings,
        advance_bookings,
        create_booking,
        update_booking,
        checkin_booking,
        checkout_booking,
        extend_booking,
        delete_booking
    ),
    components(schemas(
        Booking,
        BookingSummary,
        NewBooking,
        UpdateBooking,
        StatusChange,
        ExtendBooking,
        BookingStatus
    )),
    tags((name = "Bookings", description = "Stay lifecycle management"))
)]
pub struct BookingDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stay_starting_now_or_earlier_is_checked_in() {
        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();
        assert_eq!(initial_status(now, now), BookingStatus::CheckedIn);
        assert_eq!(
            initial_status(now - chrono::Duration::minutes(1), now),
            BookingStatus::CheckedIn
        );
        assert_eq!(
            initial_status(now + chrono::Duration::minutes(1), now),
            BookingStatus::Reserved
        );
    }

    #[test]
    fn absent_fields_fail_before_the_date_is_parsed() {
        let err = validate_stay_fields(0, 1, "garbage", 3, 2).unwrap_err();
        assert_eq!(err.code(), "missing");
        let err = validate_stay_fields(1, 1, "", 3, 2).unwrap_err();
        assert_eq!(err.code(), "missing");
        let err = validate_stay_fields(1, 1, "2026-08-21T14:00", 4, 2).unwrap_err();
        assert_eq!(err.code(), "missing");
        let err = validate_stay_fields(1, 1, "2026-08-21T14:00", 3, 0).unwrap_err();
        assert_eq!(err.code(), "missing");
    }

    #[test]
    fn unparseable_date_is_its_own_failure() {
        let err = validate_stay_fields(1, 1, "2026-13-40T99:99", 3, 2).unwrap_err();
        assert_eq!(err.code(), "date");
    }

    #[test]
    fn valid_fields_parse_to_the_utc_instant() {
        let check_in = validate_stay_fields(1, 1, "2026-08-21T14:00", 5, 2).unwrap();
        assert_eq!(
            check_in,
            Utc.with_ymd_and_hms(2026, 8, 21, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn extension_must_be_between_one_and_twentyfour_hours() {
        assert!(valid_extend_hours(1));
        assert!(valid_extend_hours(24));
        assert!(!valid_extend_hours(0));
        assert!(!valid_extend_hours(25));
        assert!(!valid_extend_hours(-5));
    }

    fn at(base: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
        base + chrono::Duration::hours(hours)
    }

    #[test]
    fn staggered_stays_on_one_room_collide() {
        // Room booked now+1h for 3h; a second request at now+2h for 3h
        // overlaps it from now+2h to now+4h.
        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();
        assert!(windows_overlap(at(now, 1), at(now, 4), at(now, 2), at(now, 5)));
        // Same collision seen from the other side.
        assert!(windows_overlap(at(now, 2), at(now, 5), at(now, 1), at(now, 4)));
    }

    #[test]
    fn a_window_inside_a_longer_stay_collides() {
        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();
        assert!(windows_overlap(at(now, 0), at(now, 24), at(now, 5), at(now, 8)));
        assert!(windows_overlap(at(now, 5), at(now, 8), at(now, 0), at(now, 24)));
    }

    #[test]
    fn back_to_back_stays_do_not_collide() {
        // The interval is half-open, so a stay ending exactly when the
        // next begins leaves the room free at the boundary.
        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();
        assert!(!windows_overlap(at(now, 1), at(now, 4), at(now, 4), at(now, 7)));
        assert!(!windows_overlap(at(now, 4), at(now, 7), at(now, 1), at(now, 4)));
        // Fully disjoint windows obviously do not collide either.
        assert!(!windows_overlap(at(now, 1), at(now, 4), at(now, 9), at(now, 12)));
    }

    #[test]
    fn extension_tail_collides_only_when_it_reaches_the_next_stay() {
        // Current check-out at now+3h, next booking at now+5h for 3h.
        // A 2h extension fills the gap exactly; a 4h one runs into it.
        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();
        let check_out = at(now, 3);
        let (next_in, next_out) = (at(now, 5), at(now, 8));
        assert!(!windows_overlap(next_in, next_out, check_out, add_hours(check_out, 2)));
        assert!(windows_overlap(next_in, next_out, check_out, add_hours(check_out, 4)));
    }

    #[test]
    fn pax_over_capacity_fails_even_when_every_other_field_is_valid() {
        assert!(validate_stay_fields(1, 1, "2026-08-21T14:00", 3, 3).is_ok());
        let err = check_capacity(3, 2).unwrap_err();
        assert_eq!(err.code(), "pax");
    }

    #[test]
    fn pax_at_or_under_capacity_passes() {
        assert!(check_capacity(2, 2).is_ok());
        assert!(check_capacity(1, 4).is_ok());
        assert!(check_capacity(5, 4).is_err());
    }
}
