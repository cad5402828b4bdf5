use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use tracing::warn;
use uuid::Uuid;

use super::{claims::SessionClaims, session::SessionIssuer};
use crate::error::ApiError;

/// Pulls the raw token from `Authorization: Bearer` or, failing that, the
/// session cookie.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }
    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

pub fn resolve_session(headers: &HeaderMap, keys: &SessionIssuer) -> Option<SessionClaims> {
    session_token(headers, keys.cookie_name()).and_then(|t| keys.resolve(&t))
}

/// Claims of the caller, if any valid session accompanies the request.
pub struct MaybeSession(pub Option<SessionClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
    SessionIssuer: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionIssuer::from_ref(state);
        Ok(MaybeSession(resolve_session(&parts.headers, &keys)))
    }
}

/// Requires a valid session and yields the caller's user id.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionIssuer: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionIssuer::from_ref(state);
        match resolve_session(&parts.headers, &keys) {
            Some(claims) => Ok(AuthUser(claims.id)),
            None => {
                warn!(path = %parts.uri.path(), "missing or invalid session");
                Err(ApiError::AuthenticationRequired)
            }
        }
    }
}
