use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{
    dto::{PublicProfile, UpdateProfileRequest},
    repo_types::UserUpdate,
};
use crate::{
    auth::{
        extractors::AuthUser,
        ownership::ensure_owner,
        password,
        validation::{validate_email, validate_password},
    },
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    pagination::{Page, PageParams},
    posts::{handlers::list_page, repo_types::{PostFilter, PostWithAuthor}},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/:id", get(get_profile).put(update_profile))
        .route("/user/:id/blogs", get(list_user_posts))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<PublicProfile>> {
    state
        .users
        .find_by_id(id)
        .await?
        .map(|u| Json(u.into()))
        .ok_or(ApiError::NotFound("User"))
}

#[instrument(skip(state))]
pub async fn list_user_posts(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<PostWithAuthor>>> {
    if state.users.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound("User"));
    }
    Ok(Json(list_page(&state, PostFilter::by_author(id), &params).await?))
}

fn non_blank(field: &str, value: Option<String>) -> ApiResult<Option<String>> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(ApiError::Validation(format!("{field} must not be blank"))),
        other => Ok(other),
    }
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<PublicProfile>> {
    ensure_owner(user_id, id)?;

    let email = payload.email.as_deref().map(validate_email).transpose()?;
    let username = non_blank("username", payload.username)?;
    let image_url = non_blank("image_url", payload.image_url)?;
    let password_hash = match payload.password {
        Some(plain) => {
            validate_password(&plain, state.config.min_password_len)?;
            Some(password::hash(plain).await?)
        }
        None => None,
    };

    let update = UserUpdate {
        email,
        username,
        image_url,
        password_hash,
    };
    if update.is_empty() {
        return Err(ApiError::Validation("Nothing to update".into()));
    }

    if let Some(email) = &update.email {
        if let Some(other) = state.users.find_by_email(email).await? {
            if other.id != id {
                debug!(%user_id, "email taken by another user");
                return Err(ApiError::Conflict("Email already in use".into()));
            }
        }
    }

    let user = state
        .users
        .update_fields(id, &update)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    info!(
        %user_id,
        password_changed = update.password_hash.is_some(),
        "profile updated"
    );
    Ok(Json(user.into()))
}
