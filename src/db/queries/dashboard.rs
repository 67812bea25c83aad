use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use utoipa::OpenApi;

use crate::db::models::booking::BookingSummary;
use crate::error::DomainError;
use crate::utils::api_response::ApiResponse;

/// Headline numbers for the landing page: room totals by status, active
/// stays, and the next few arrivals and occupants.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Occupancy summary"),
        (status = 401, description = "No valid session")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Dashboard"
)]
pub async fn get_dashboard(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<serde_json::Value>, DomainError> {
    let total_rooms: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rooms")
        .fetch_one(&pool)
        .await?;
    let vacant_rooms: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM rooms WHERE status = 'vacant'")
            .fetch_one(&pool)
            .await?;
    let occupied_rooms: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM rooms WHERE status = 'occupied'")
            .fetch_one(&pool)
            .await?;
    let active_stays: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE status = 'checked_in'")
            .fetch_one(&pool)
            .await?;

    let upcoming = sqlx::query_as::<_, BookingSummary>(
        "SELECT b.id, b.guest_id, b.room_id, b.check_in, b.check_out, b.stay_hours, b.pax,
                b.status, b.created_at,
                g.full_name AS guest_name, r.room_number AS room_number
         FROM bookings b
         LEFT JOIN guests g ON g.id = b.guest_id
         LEFT JOIN rooms r ON r.id = b.room_id
         WHERE b.status IN ('reserved', 'checked_in')
         ORDER BY b.check_in ASC
         LIMIT 6",
    )
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Dashboard retrieved successfully",
        json!({
            "total_rooms": total_rooms,
            "vacant_rooms": vacant_rooms,
            "occupied_rooms": occupied_rooms,
            "active_stays": active_stays,
            "upcoming": upcoming,
        }),
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(get_dashboard),
    components(schemas(BookingSummary)),
    tags((name = "Dashboard", description = "Occupancy overview"))
)]
pub struct DashboardDoc;
