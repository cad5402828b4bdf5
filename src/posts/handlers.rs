use axum::{
    extract::{Query, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::PostBody,
    repo_types::{Post, PostFilter, PostWithAuthor},
};
use crate::{
    auth::{extractors::AuthUser, ownership::ensure_owner},
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    pagination::{paginate, Page, PageParams, PageRequest},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/blogs", get(list_posts))
        .route("/blogs/:id", get(get_post))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/blogs", post(create_post))
        .route("/blogs/:id", put(update_post).delete(delete_post))
}

/// Shared by the global feed and per-author listings.
pub(crate) async fn list_page(
    state: &AppState,
    filter: PostFilter,
    params: &PageParams,
) -> ApiResult<Page<PostWithAuthor>> {
    let req = PageRequest::from_params(params, &state.config.pagination);
    let page = paginate(
        req,
        state.posts.list_with_authors(&filter, req.skip(), req.limit),
        state.posts.count(&filter),
    )
    .await?;
    Ok(page)
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<PostWithAuthor>>> {
    Ok(Json(list_page(&state, PostFilter::default(), &params).await?))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Post>> {
    state
        .posts
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Blog"))
}

#[instrument(skip(state, body))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<PostBody>,
) -> ApiResult<(StatusCode, HeaderMap, Json<Post>)> {
    let (title, content) = body.validate()?;
    let post = state.posts.insert(user_id, &title, &content).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/blogs/{}", post.id)) {
        headers.insert(LOCATION, location);
    }

    info!(%user_id, post_id = %post.id, "post created");
    Ok((StatusCode::CREATED, headers, Json(post)))
}

/// Loads the post and checks the caller owns it.
async fn load_owned(state: &AppState, caller: Uuid, id: Uuid) -> ApiResult<Post> {
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Blog"))?;
    ensure_owner(caller, post.author_id)?;
    Ok(post)
}

#[instrument(skip(state, body))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<PostBody>,
) -> ApiResult<Json<Post>> {
    let update = body.into_update()?;
    load_owned(&state, user_id, id).await?;

    let post = state
        .posts
        .update_fields(id, &update)
        .await?
        .ok_or(ApiError::NotFound("Blog"))?;

    info!(%user_id, post_id = %id, "post updated");
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    load_owned(&state, user_id, id).await?;
    if !state.posts.delete(id).await? {
        return Err(ApiError::NotFound("Blog"));
    }
    info!(%user_id, post_id = %id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}
