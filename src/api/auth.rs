use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::config::Config;
use crate::db::models::staff::{StaffCredentials, StaffRole};
use crate::error::DomainError;
use crate::utils::api_response::ApiResponse;

/// Name of the HTTP-only session cookie.
pub const SESSION_COOKIE: &str = "ht_session";

const SESSION_TTL_DAYS: i64 = 7;
const SESSION_TTL_SECS: i64 = SESSION_TTL_DAYS * 24 * 3600;

/// Claims carried by the session token. `sub` is the staff id as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub full_name: String,
    pub role: StaffRole,
    pub exp: usize,
}

impl Claims {
    pub fn new(id: i32, username: &str, full_name: &str, role: StaffRole) -> Self {
        Self {
            sub: id.to_string(),
            username: username.to_owned(),
            full_name: full_name.to_owned(),
            role,
            exp: (Utc::now() + Duration::days(SESSION_TTL_DAYS)).timestamp() as usize,
        }
    }

    pub fn user_id(&self) -> Result<i32, DomainError> {
        self.sub
            .parse()
            .map_err(|_| DomainError::Auth("Invalid or expired session."))
    }

    pub fn is_admin(&self) -> bool {
        self.role == StaffRole::Admin
    }
}

pub fn issue_session_token(claims: &Claims, secret: &str) -> Result<String, DomainError> {
    Ok(encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn verify_session_token(token: &str, secret: &str) -> Result<Claims, DomainError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| DomainError::Auth("Invalid or expired session."))
}

fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}")
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub role: StaffRole,
}

/// The signed-in account as seen by the frontend shell.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: StaffRole,
}

/// Verifies staff credentials and opens a session. The token is returned in
/// the body and also set as the HTTP-only session cookie.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid username or password"),
        (status = 403, description = "Account is disabled")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(pool): State<PgPool>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, DomainError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(DomainError::Validation("Enter both username and password."));
    }

    let account: Option<StaffCredentials> = sqlx::query_as::<_, StaffCredentials>(
        "SELECT id, username, full_name, role, active, password_hash
         FROM staff_users WHERE username = $1",
    )
    .bind(payload.username.trim())
    .fetch_optional(&pool)
    .await?;

    let Some(account) = account else {
        warn!(
            "❌ Login attempt for unknown username: {}",
            payload.username.trim()
        );
        return Err(DomainError::Auth("Invalid username or password."));
    };

    if !account.active {
        warn!("🔒 Login attempt for disabled account: {}", account.username);
        return Err(DomainError::Inactive);
    }

    if !verify(&payload.password, &account.password_hash)? {
        warn!("❌ Invalid password for user: {}", account.username);
        return Err(DomainError::Auth("Invalid username or password."));
    }

    let claims = Claims::new(
        account.id,
        &account.username,
        &account.full_name,
        account.role,
    );
    let token = issue_session_token(&claims, &Config::get().jwt_secret)?;
    info!("✅ Login successful for {}", account.username);

    let body = ApiResponse::success(
        StatusCode::OK,
        "Login successful.",
        LoginResponse {
            token: token.clone(),
            role: account.role,
        },
    );
    Ok((
        AppendHeaders([(SET_COOKIE, session_cookie(&token, SESSION_TTL_SECS))]),
        body,
    )
        .into_response())
}

/// Closes the session by expiring the cookie. Bearer tokens simply age out;
/// there is no server-side session store to clear.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Session cleared")),
    tag = "Authentication"
)]
pub async fn logout() -> Response {
    (
        AppendHeaders([(SET_COOKIE, session_cookie("", 0))]),
        ApiResponse::success(StatusCode::OK, "Logged out.", ()),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current session", body = SessionUser),
        (status = 401, description = "No valid session")
    ),
    security(("bearerAuth" = []), ("cookieAuth" = [])),
    tag = "Authentication"
)]
pub async fn me(
    Extension(claims): Extension<Claims>,
) -> Result<ApiResponse<SessionUser>, DomainError> {
    let user = SessionUser {
        id: claims.user_id()?,
        username: claims.username.clone(),
        full_name: claims.full_name.clone(),
        role: claims.role,
    };
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Session retrieved.",
        user,
    ))
}

pub fn auth_routes() -> Router<PgPool> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn session_routes() -> Router<PgPool> {
    Router::new().route("/auth/me", get(me))
}

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookieAuth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(login, logout, me),
    components(schemas(LoginRequest, LoginResponse, SessionUser, StaffRole)),
    tags((name = "Authentication", description = "Staff session endpoints")),
    modifiers(&SecurityAddon)
)]
pub struct AuthDoc;

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips_with_role_intact() {
        let claims = Claims::new(7, "alice", "Alice Reyes", StaffRole::Admin);
        let token = issue_session_token(&claims, SECRET).unwrap();
        let decoded = verify_session_token(&token, SECRET).unwrap();
        assert_eq!(decoded.user_id().unwrap(), 7);
        assert_eq!(decoded.username, "alice");
        assert_eq!(decoded.full_name, "Alice Reyes");
        assert!(decoded.is_admin());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let claims = Claims::new(7, "alice", "Alice Reyes", StaffRole::Staff);
        let token = issue_session_token(&claims, SECRET).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(verify_session_token(&tampered, SECRET).is_err());
        assert!(verify_session_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::new(7, "alice", "Alice Reyes", StaffRole::Staff);
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp() as usize;
        let token = issue_session_token(&claims, SECRET).unwrap();
        assert!(verify_session_token(&token, SECRET).is_err());
    }

    #[test]
    fn non_numeric_subject_is_an_auth_error() {
        let claims = Claims {
            sub: "not-a-number".into(),
            username: "x".into(),
            full_name: "x".into(),
            role: StaffRole::Staff,
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        assert!(claims.user_id().is_err());
    }

    #[test]
    fn session_cookie_is_http_only_and_scoped_to_root() {
        let cookie = session_cookie("abc", SESSION_TTL_SECS);
        assert!(cookie.starts_with("ht_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(session_cookie("", 0).contains("Max-Age=0"));
    }
}
