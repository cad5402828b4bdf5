use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, CredentialsRequest, PublicUser, RegisterResponse},
        extractors::MaybeSession,
        password,
        session::{session_from_claims, SessionView},
        validation::{normalize_email, validate_email, validate_password},
    },
    db::RepoError,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(current_session))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".into()));
    }
    let email = validate_email(&payload.email)?;
    validate_password(&payload.password, state.config.min_password_len)?;

    // Fast path only; the unique index decides races below.
    if state.users.find_by_email(&email).await?.is_some() {
        debug!("email already registered");
        return Err(ApiError::Conflict("User with this email already exists".into()));
    }

    let hash = password::hash(payload.password).await?;

    let user = match state.users.insert(&email, &hash).await {
        Ok(u) => u,
        Err(RepoError::Conflict(_)) => {
            debug!("email registered concurrently");
            return Err(ApiError::Conflict("User with this email already exists".into()));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful",
            user: PublicUser {
                id: user.id,
                email: user.email,
            },
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::InvalidCredentials);
    }

    let user = match state.users.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            password::verify_dummy(payload.password).await;
            warn!("login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !password::verify(payload.password, user.password_hash.clone()).await {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.sessions.issue(user.id)?;
    let max_age = time::Duration::seconds(state.sessions.ttl().as_secs() as i64);
    let cookie = Cookie::build((state.sessions.cookie_name().to_string(), token.clone()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age);

    info!(user_id = %user.id, "user logged in");
    Ok((
        jar.add(cookie),
        Json(AuthResponse {
            token,
            user: PublicUser {
                id: user.id,
                email: user.email,
            },
        }),
    ))
}

/// Drops the client's cookie. Tokens already handed out stay valid until
/// they expire.
#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let cookie = Cookie::build((state.sessions.cookie_name().to_string(), "")).path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

#[instrument(skip(state, session))]
pub async fn current_session(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> ApiResult<Json<Option<SessionView>>> {
    let Some(claims) = session else {
        return Ok(Json(None));
    };
    let view = state
        .users
        .find_by_id(claims.id)
        .await?
        .map(|user| session_from_claims(&claims, &user));
    Ok(Json(view))
}
