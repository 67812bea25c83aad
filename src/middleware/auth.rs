use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use headers::{Cookie, HeaderMapExt};
use tracing::warn;

use crate::api::auth::{verify_session_token, Claims, SESSION_COOKIE};
use crate::config::Config;
use crate::error::DomainError;

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Cookie>()?
        .get(SESSION_COOKIE)
        .map(str::to_owned)
}

/// Authenticates the request from the `Authorization: Bearer` header or the
/// session cookie, in that order, and stores the verified [`Claims`] as a
/// request extension for handlers downstream.
pub async fn session_middleware(mut req: Request<Body>, next: Next) -> Result<Response, Response> {
    let token = bearer_token(req.headers()).or_else(|| cookie_token(req.headers()));

    let Some(token) = token else {
        warn!("Unauthenticated request to {}", req.uri().path());
        return Err(DomainError::Auth("Invalid or expired session.").into_response());
    };

    let claims = verify_session_token(&token, &Config::get().jwt_secret).map_err(|err| {
        warn!("Session verification failed for {}", req.uri().path());
        err.into_response()
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Gate for the admin-only route group. Runs inside `session_middleware`,
/// so the claims extension is already present on authenticated requests.
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, Response> {
    let is_admin = req
        .extensions()
        .get::<Claims>()
        .map(Claims::is_admin)
        .unwrap_or(false);

    if !is_admin {
        warn!("Non-admin request blocked: {}", req.uri().path());
        return Err(DomainError::Forbidden("Admin access required.").into_response());
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        headers.insert(
            COOKIE,
            HeaderValue::from_static("ht_session=cookie-token; theme=dark"),
        );
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));
        assert_eq!(cookie_token(&headers).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn cookie_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; ht_session=tok123"),
        );
        assert_eq!(cookie_token(&headers).as_deref(), Some("tok123"));
    }

    #[test]
    fn missing_credentials_yield_none() {
        let headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());
        assert!(cookie_token(&headers).is_none());

        let mut basic = HeaderMap::new();
        basic.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(bearer_token(&basic).is_none());
    }
}
