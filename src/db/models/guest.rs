use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct Guest {
    pub id: i32,
    pub full_name: String,
    pub age: i32,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewGuest {
    pub full_name: String,
    pub age: i32,
    pub contact: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGuest {
    pub full_name: String,
    pub age: i32,
    pub contact: Option<String>,
    pub email: Option<String>,
}

/// Philippine mobile format: exactly 11 digits starting with `09`.
pub fn contact_is_valid(contact: &str) -> bool {
    contact.len() == 11
        && contact.starts_with("09")
        && contact.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_standard_mobile_number() {
        assert!(contact_is_valid("09171234567"));
    }

    #[test]
    fn rejects_wrong_length_prefix_or_characters() {
        assert!(!contact_is_valid("0917123456"));
        assert!(!contact_is_valid("091712345678"));
        assert!(!contact_is_valid("08171234567"));
        assert!(!contact_is_valid("0917123456a"));
        assert!(!contact_is_valid("+6391712345"));
        assert!(!contact_is_valid(""));
    }
}
