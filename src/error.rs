use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::utils::api_response::ApiResponse;

/// Failure modes of the staff-facing operations. Each variant maps to a
/// fixed HTTP status plus a short machine-readable code carried inside the
/// response envelope, so clients branch on the code instead of parsing
/// message text.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("{0}")]
    Parse(&'static str),
    #[error("Check-in must be today or later.")]
    PastDate,
    #[error("Pax exceeds room capacity.")]
    Capacity,
    #[error("Room is not available for those dates.")]
    Conflict,
    #[error("{0}")]
    Duplicate(&'static str),
    #[error("Room has active bookings.")]
    InUse,
    #[error("Guest must be 18+.")]
    Age,
    #[error("Contact must be 11 digits and start with 09.")]
    ContactFormat,
    #[error("{0}")]
    Auth(&'static str),
    #[error("This account is disabled.")]
    Inactive,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("You cannot delete your own account.")]
    SelfDelete,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Password hashing failed")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Session token could not be issued")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl DomainError {
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "missing",
            DomainError::Parse(_) => "date",
            DomainError::PastDate => "past",
            DomainError::Capacity => "pax",
            DomainError::Conflict => "conflict",
            DomainError::Duplicate(_) => "duplicate",
            DomainError::InUse => "inuse",
            DomainError::Age => "age",
            DomainError::ContactFormat => "contact",
            DomainError::Auth(_) => "invalid",
            DomainError::Inactive => "inactive",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::SelfDelete => "self",
            DomainError::NotFound(_) => "notfound",
            DomainError::Hash(_) | DomainError::Token(_) | DomainError::Database(_) => "error",
        }
    }

    /// Error payload as sent to the client: the stable code, nothing else.
    /// Internal failure text stays in the logs.
    pub fn wire_errors(&self) -> serde_json::Value {
        json!({ "code": self.code() })
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DomainError::Validation(_)
            | DomainError::Parse(_)
            | DomainError::PastDate
            | DomainError::Capacity
            | DomainError::Age
            | DomainError::ContactFormat
            | DomainError::SelfDelete => StatusCode::BAD_REQUEST,
            DomainError::Conflict | DomainError::Duplicate(_) | DomainError::InUse => {
                StatusCode::CONFLICT
            }
            DomainError::Auth(_) => StatusCode::UNAUTHORIZED,
            DomainError::Inactive | DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Hash(_) | DomainError::Token(_) | DomainError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        match &self {
            DomainError::Database(e) => error!("Database failure: {e}"),
            DomainError::Hash(e) => error!("Password hashing failure: {e}"),
            DomainError::Token(e) => error!("Token issuance failure: {e}"),
            _ => {}
        }
        ApiResponse::<()>::error(self.status(), self.to_string(), Some(self.wire_errors()))
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_family_maps_to_bad_request() {
        for err in [
            DomainError::Validation("Fill out all fields."),
            DomainError::Parse("Invalid check-in date."),
            DomainError::PastDate,
            DomainError::Capacity,
            DomainError::Age,
            DomainError::ContactFormat,
            DomainError::SelfDelete,
        ] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn conflict_family_maps_to_409() {
        for err in [
            DomainError::Conflict,
            DomainError::Duplicate("Room number already exists."),
            DomainError::InUse,
        ] {
            assert_eq!(err.status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(DomainError::Validation("x").code(), "missing");
        assert_eq!(DomainError::Parse("x").code(), "date");
        assert_eq!(DomainError::PastDate.code(), "past");
        assert_eq!(DomainError::Capacity.code(), "pax");
        assert_eq!(DomainError::Conflict.code(), "conflict");
        assert_eq!(DomainError::Duplicate("x").code(), "duplicate");
        assert_eq!(DomainError::InUse.code(), "inuse");
        assert_eq!(DomainError::Age.code(), "age");
        assert_eq!(DomainError::ContactFormat.code(), "contact");
        assert_eq!(DomainError::Auth("x").code(), "invalid");
        assert_eq!(DomainError::Inactive.code(), "inactive");
        assert_eq!(DomainError::Forbidden("x").code(), "forbidden");
        assert_eq!(DomainError::SelfDelete.code(), "self");
        assert_eq!(DomainError::NotFound("x").code(), "notfound");
    }

    #[test]
    fn internal_failure_detail_stays_out_of_the_envelope() {
        let err = DomainError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.wire_errors(), json!({ "code": "error" }));
        assert_eq!(err.to_string(), "Database error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_failures_are_unauthorized() {
        assert_eq!(
            DomainError::Auth("Invalid username or password.").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(DomainError::Inactive.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            DomainError::Forbidden("Admin access required.").status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn fixed_messages_match_the_console_popups() {
        assert_eq!(
            DomainError::PastDate.to_string(),
            "Check-in must be today or later."
        );
        assert_eq!(
            DomainError::Conflict.to_string(),
            "Room is not available for those dates."
        );
        assert_eq!(
            DomainError::ContactFormat.to_string(),
            "Contact must be 11 digits and start with 09."
        );
        assert_eq!(DomainError::Age.to_string(), "Guest must be 18+.");
    }
}
