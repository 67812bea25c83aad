use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

/// Uniform JSON envelope returned by every handler, success or failure.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(
        status: StatusCode,
        message: impl Into<String>,
        data: Option<T>,
        errors: Option<serde_json::Value>,
    ) -> Self {
        Self {
            success: status.is_success(),
            status_code: status.as_u16(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
            data,
            errors,
        }
    }

    pub fn success(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self::new(status, message, Some(data), None)
    }

    pub fn error(
        status: StatusCode,
        message: impl Into<String>,
        errors: Option<serde_json::Value>,
    ) -> Self {
        Self::new(status, message, None, errors)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!(self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_data() {
        let resp = ApiResponse::success(StatusCode::OK, "Rooms retrieved successfully", vec![1, 2]);
        assert!(resp.success);
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.data, Some(vec![1, 2]));
        assert!(resp.errors.is_none());
    }

    #[test]
    fn error_envelope_has_no_data() {
        let resp = ApiResponse::<()>::error(
            StatusCode::CONFLICT,
            "Room is not available for those dates.",
            Some(json!({ "code": "conflict" })),
        );
        assert!(!resp.success);
        assert_eq!(resp.status_code, 409);
        assert!(resp.data.is_none());
        assert_eq!(resp.errors, Some(json!({ "code": "conflict" })));
    }
}
