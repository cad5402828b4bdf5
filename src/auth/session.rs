use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::claims::SessionClaims,
    config::{SessionConfig, MAX_SESSION_TTL_MINUTES},
    state::AppState,
    users::repo_types::User,
};

/// Signs and verifies stateless session tokens (HS256 JWT).
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    cookie_name: String,
}

impl FromRef<AppState> for SessionIssuer {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl SessionIssuer {
    pub fn new(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: Duration::from_secs(cfg.ttl_minutes.clamp(1, MAX_SESSION_TTL_MINUTES) as u64 * 60),
            cookie_name: cfg.cookie_name.clone(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = SessionClaims {
            id: user_id,
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
        };
        let token = self.sign(&claims)?;
        debug!(user_id = %user_id, "session token issued");
        Ok(token)
    }

    fn sign(&self, claims: &SessionClaims) -> anyhow::Result<String> {
        Ok(encode(&Header::default(), claims, &self.encoding)?)
    }

    /// Returns the claims of a well-signed, unexpired token. Every failure
    /// (empty, bad signature, expired, malformed) yields `None`.
    pub fn resolve(&self, token: &str) -> Option<SessionClaims> {
        if token.is_empty() {
            return None;
        }
        match decode::<SessionClaims>(token, &self.decoding, &Validation::default()) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!(error = %e, "session token rejected");
                None
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// What `/api/auth/session` exposes about the current session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub user: SessionUser,
}

/// Projects verified claims plus the stored user into the session view.
/// The id always comes from the claims.
pub fn session_from_claims(claims: &SessionClaims, user: &User) -> SessionView {
    SessionView {
        user: SessionUser {
            id: claims.id,
            email: user.email.clone(),
            name: user.username.clone().unwrap_or_else(|| user.email.clone()),
        },
    }
}
