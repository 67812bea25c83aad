use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Stay lengths offered at booking time, in hours.
pub const STAY_HOURS: [i32; 5] = [3, 5, 8, 12, 24];

pub fn is_allowed_stay(hours: i32) -> bool {
    STAY_HOURS.contains(&hours)
}

/// Lifecycle of a booking. `reserved` and `checked_in` are the active
/// states that occupy a room for conflict purposes; the other two are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum BookingStatus {
    Reserved,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: i32,
    pub guest_id: Option<i32>,
    pub room_id: Option<i32>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub stay_hours: i32,
    pub pax: i32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Booking row joined with display fields. The references are nullable, so
/// both joined names are explicit options rather than fabricated defaults.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct BookingSummary {
    pub id: i32,
    pub guest_id: Option<i32>,
    pub room_id: Option<i32>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub stay_hours: i32,
    pub pax: i32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub guest_name: Option<String>,
    pub room_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewBooking {
    pub guest_id: i32,
    pub room_id: i32,
    /// Local wall-clock check-in, `YYYY-MM-DDTHH:MM`.
    pub check_in: String,
    pub stay_hours: i32,
    pub pax: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBooking {
    pub guest_id: i32,
    pub room_id: i32,
    pub check_in: String,
    pub stay_hours: i32,
    pub pax: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusChange {
    pub room_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtendBooking {
    pub room_id: Option<i32>,
    pub extend_hours: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_offered_stay_lengths_are_allowed() {
        for hours in STAY_HOURS {
            assert!(is_allowed_stay(hours));
        }
        for hours in [0, 1, 2, 4, 6, 7, 13, 23, 25, -3] {
            assert!(!is_allowed_stay(hours));
        }
    }

    #[test]
    fn statuses_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::CheckedIn).ok(),
            Some("\"checked_in\"".to_string())
        );
        assert_eq!(
            serde_json::from_str::<BookingStatus>("\"cancelled\"").ok(),
            Some(BookingStatus::Cancelled)
        );
    }
}
