use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use sqlx::PgPool;
use tracing::info;
use utoipa::OpenApi;

use crate::api::auth::Claims;
use crate::db::models::room::{
    compare_room_numbers, NewRoom, Room, RoomStatus, RoomType, UpdateRoom, UpdateRoomStatus,
};
use crate::error::DomainError;
use crate::utils::api_response::ApiResponse;

/// Lists every room, ordered by room number. Numbers sort numerically when
/// they can, so "2" comes before "10".
#[utoipa::path(
    get,
    path = "/rooms",
    responses(
        (status = 200, description = "All rooms", body = [Room]),
        (status = 401, description = "No valid session")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Rooms"
)]
pub async fn get_rooms(State(pool): State<PgPool>) -> Result<ApiResponse<Vec<Room>>, DomainError> {
    let mut rooms = sqlx::query_as::<_, Room>(
        "SELECT id, room_number, room_type, capacity, status, created_at FROM rooms",
    )
    .fetch_all(&pool)
    .await?;

    rooms.sort_by(|a, b| compare_room_numbers(&a.room_number, &b.room_number));

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Rooms retrieved successfully",
        rooms,
    ))
}

/// Adds a room. Capacity is derived from the room type and the status
/// always starts vacant.
#[utoipa::path(
    post,
    path = "/rooms",
    request_body = NewRoom,
    responses(
        (status = 201, description = "Room created", body = Room),
        (status = 400, description = "Missing room number or type"),
        (status = 409, description = "Room number already exists"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Rooms"
)]
pub async fn create_room(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewRoom>,
) -> Result<ApiResponse<Room>, DomainError> {
    let room_number = payload.room_number.trim();
    if room_number.is_empty() {
        return Err(DomainError::Validation("Fill out all fields."));
    }

    let taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rooms WHERE room_number = $1)")
            .bind(room_number)
            .fetch_one(&pool)
            .await?;
    if taken {
        return Err(DomainError::Duplicate("Room number already exists."));
    }

    let result = sqlx::query_as::<_, Room>(
        "INSERT INTO rooms (room_number, room_type, capacity, status)
         VALUES ($1, $2, $3, 'vacant')
         RETURNING id, room_number, room_type, capacity, status, created_at",
    )
    .bind(room_number)
    .bind(payload.room_type)
    .bind(payload.room_type.capacity())
    .fetch_one(&pool)
    .await;

    match result {
        Ok(room) => {
            info!("Room {} added by {}", room.room_number, claims.username);
            Ok(ApiResponse::success(
                StatusCode::CREATED,
                "Room added.",
                room,
            ))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23505") {
                    return Err(DomainError::Duplicate("Room number already exists."));
                }
            }
            Err(e.into())
        }
    }
}

/// Rewrites a room's number, type and status. Capacity is recomputed from
/// the type on every update, keeping it consistent even across type changes.
#[utoipa::path(
    put,
    path = "/rooms/{room_id}",
    params(("room_id" = i32, Path, description = "Room ID")),
    request_body = UpdateRoom,
    responses(
        (status = 200, description = "Room updated", body = Room),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Room number already exists")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Rooms"
)]
pub async fn update_room(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<i32>,
    Json(payload): Json<UpdateRoom>,
) -> Result<ApiResponse<Room>, DomainError> {
    let room_number = payload.room_number.trim();
    if room_number.is_empty() {
        return Err(DomainError::Validation("Fill out all fields."));
    }

    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM rooms WHERE room_number = $1 AND id <> $2)",
    )
    .bind(room_number)
    .bind(room_id)
    .fetch_one(&pool)
    .await?;
    if taken {
        return Err(DomainError::Duplicate("Room number already exists."));
    }

    let result = sqlx::query_as::<_, Room>(
        "UPDATE rooms SET room_number = $1, room_type = $2, capacity = $3, status = $4
         WHERE id = $5
         RETURNING id, room_number, room_type, capacity, status, created_at",
    )
    .bind(room_number)
    .bind(payload.room_type)
    .bind(payload.room_type.capacity())
    .bind(payload.status)
    .bind(room_id)
    .fetch_optional(&pool)
    .await;

    match result {
        Ok(Some(room)) => {
            info!("Room {} updated by {}", room.room_number, claims.username);
            Ok(ApiResponse::success(StatusCode::OK, "Room updated.", room))
        }
        Ok(None) => Err(DomainError::NotFound("Room not found.")),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23505") {
                    return Err(DomainError::Duplicate("Room number already exists."));
                }
            }
            Err(e.into())
        }
    }
}

/// Overwrites only the status. Deliberately unguarded: housekeeping may
/// flag an occupied room for maintenance without touching its bookings.
#[utoipa::path(
    patch,
    path = "/rooms/{room_id}/status",
    params(("room_id" = i32, Path, description = "Room ID")),
    request_body = UpdateRoomStatus,
    responses(
        (status = 200, description = "Status updated", body = Room),
        (status = 404, description = "Room not found")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Rooms"
)]
pub async fn update_room_status(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<i32>,
    Json(payload): Json<UpdateRoomStatus>,
) -> Result<ApiResponse<Room>, DomainError> {
    let room = sqlx::query_as::<_, Room>(
        "UPDATE rooms SET status = $1 WHERE id = $2
         RETURNING id, room_number, room_type, capacity, status, created_at",
    )
    .bind(payload.status)
    .bind(room_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(DomainError::NotFound("Room not found."))?;

    info!(
        "Room {} status set to {:?} by {}",
        room.room_number, room.status, claims.username
    );
    Ok(ApiResponse::success(StatusCode::OK, "Room updated.", room))
}

/// Removes a room unless it still has reserved or checked-in bookings.
#[utoipa::path(
    delete,
    path = "/rooms/{room_id}",
    params(("room_id" = i32, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room deleted"),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Room has active bookings")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Rooms"
)]
pub async fn delete_room(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(room_id): Path<i32>,
) -> Result<ApiResponse<()>, DomainError> {
    let in_use: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM bookings
         WHERE room_id = $1 AND status IN ('reserved', 'checked_in'))",
    )
    .bind(room_id)
    .fetch_one(&pool)
    .await?;
    if in_use {
        return Err(DomainError::InUse);
    }

    let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
        .bind(room_id)
        .execute(&pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DomainError::NotFound("Room not found."));
    }

    info!("Room {} deleted by {}", room_id, claims.username);
    Ok(ApiResponse::success(StatusCode::OK, "Room deleted.", ()))
}

#[derive(OpenApi)]
#[openapi(
    paths(get_rooms, create_room, update_room, update_room_status, delete_room),
    components(schemas(Room, NewRoom, UpdateRoom, UpdateRoomStatus, RoomType, RoomStatus)),
    tags((name = "Rooms", description = "Room inventory management"))
)]
pub struct RoomDoc;
