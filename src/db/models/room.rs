use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;
use utoipa::ToSchema;

/// Room categories offered by the property. Stored as TEXT with the
/// capitalized names; capacity is a fixed function of the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum RoomType {
    Single,
    Double,
    Family,
}

impl RoomType {
    pub fn capacity(self) -> i32 {
        match self {
            RoomType::Single => 1,
            RoomType::Double => 2,
            RoomType::Family => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RoomStatus {
    Vacant,
    Occupied,
    Maintenance,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct Room {
    pub id: i32,
    pub room_number: String,
    pub room_type: RoomType,
    pub capacity: i32,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewRoom {
    pub room_number: String,
    pub room_type: RoomType,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoom {
    pub room_number: String,
    pub room_type: RoomType,
    pub status: RoomStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoomStatus {
    pub status: RoomStatus,
}

/// Orders room numbers numerically when both sides parse as numbers, so
/// "2" sorts before "10"; falls back to plain string order otherwise.
pub fn compare_room_numbers(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_follows_room_type() {
        assert_eq!(RoomType::Single.capacity(), 1);
        assert_eq!(RoomType::Double.capacity(), 2);
        assert_eq!(RoomType::Family.capacity(), 4);
    }

    #[test]
    fn unknown_room_type_is_rejected_at_the_boundary() {
        assert!(serde_json::from_str::<RoomType>("\"Penthouse\"").is_err());
        assert!(serde_json::from_str::<RoomType>("\"single\"").is_err());
        assert_eq!(
            serde_json::from_str::<RoomType>("\"Family\"").ok(),
            Some(RoomType::Family)
        );
    }

    #[test]
    fn numeric_room_numbers_sort_numerically() {
        let mut numbers = vec!["10", "2", "101", "1"];
        numbers.sort_by(|a, b| compare_room_numbers(a, b));
        assert_eq!(numbers, vec!["1", "2", "10", "101"]);
    }

    #[test]
    fn mixed_room_numbers_fall_back_to_string_order() {
        assert_eq!(compare_room_numbers("A2", "A10"), Ordering::Greater);
        assert_eq!(compare_room_numbers("101", "A1"), Ordering::Less);
        assert_eq!(compare_room_numbers("7", "7"), Ordering::Equal);
    }
}
