use axum::extract::{Extension, State};

use crate::database::models::Post;
use crate::filter::{Listing, PageQuery};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::resources::post::{self, PostPayload};
use crate::server::AppState;
use crate::types::Requester;

/// Base path for pagination links
pub const POSTS_PATH: &str = "/api/v1/posts/";

/// GET /api/v1/posts/ - all posts, paginated when `limit` is given
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Listing<Post>> {
    let window = query.window(state.config.api.max_page_limit)?;
    let listing = post::list(state.store.as_ref(), window, POSTS_PATH).await?;
    Ok(ApiResponse::success(listing))
}

/// POST /api/v1/posts/
pub async fn create(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiJson(payload): ApiJson<PostPayload>,
) -> ApiResult<Post> {
    let post = post::create(state.store.as_ref(), &state.media, &requester, payload).await?;
    Ok(ApiResponse::created(post))
}

/// GET /api/v1/posts/:id/
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Post> {
    let post = post::retrieve(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(post))
}

/// PUT /api/v1/posts/:id/
pub async fn put(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<PostPayload>,
) -> ApiResult<Post> {
    let post =
        post::update(state.store.as_ref(), &state.media, &requester, id, payload, false).await?;
    Ok(ApiResponse::success(post))
}

/// PATCH /api/v1/posts/:id/
pub async fn patch(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<PostPayload>,
) -> ApiResult<Post> {
    let post =
        post::update(state.store.as_ref(), &state.media, &requester, id, payload, true).await?;
    Ok(ApiResponse::success(post))
}

/// DELETE /api/v1/posts/:id/
pub async fn delete(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    post::destroy(state.store.as_ref(), &requester, id).await?;
    Ok(ApiResponse::no_content())
}
