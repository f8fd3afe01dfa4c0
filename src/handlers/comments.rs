use axum::extract::{Extension, State};

use crate::database::models::Comment;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::resources::comment::{self, CommentPayload};
use crate::server::AppState;
use crate::types::Requester;

/// GET /api/v1/posts/:post_id/comments/
pub async fn list(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i64>,
) -> ApiResult<Vec<Comment>> {
    let comments = comment::list(state.store.as_ref(), post_id).await?;
    Ok(ApiResponse::success(comments))
}

/// POST /api/v1/posts/:post_id/comments/
pub async fn create(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath(post_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<CommentPayload>,
) -> ApiResult<Comment> {
    let comment = comment::create(state.store.as_ref(), &requester, post_id, payload).await?;
    Ok(ApiResponse::created(comment))
}

/// GET /api/v1/posts/:post_id/comments/:id/
pub async fn get(
    State(state): State<AppState>,
    ApiPath((post_id, id)): ApiPath<(i64, i64)>,
) -> ApiResult<Comment> {
    let comment = comment::retrieve(state.store.as_ref(), post_id, id).await?;
    Ok(ApiResponse::success(comment))
}

/// PUT /api/v1/posts/:post_id/comments/:id/
pub async fn put(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath((post_id, id)): ApiPath<(i64, i64)>,
    ApiJson(payload): ApiJson<CommentPayload>,
) -> ApiResult<Comment> {
    let comment =
        comment::update(state.store.as_ref(), &requester, post_id, id, payload, false).await?;
    Ok(ApiResponse::success(comment))
}

/// PATCH /api/v1/posts/:post_id/comments/:id/
pub async fn patch(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath((post_id, id)): ApiPath<(i64, i64)>,
    ApiJson(payload): ApiJson<CommentPayload>,
) -> ApiResult<Comment> {
    let comment =
        comment::update(state.store.as_ref(), &requester, post_id, id, payload, true).await?;
    Ok(ApiResponse::success(comment))
}

/// DELETE /api/v1/posts/:post_id/comments/:id/
pub async fn delete(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiPath((post_id, id)): ApiPath<(i64, i64)>,
) -> ApiResult<()> {
    comment::destroy(state.store.as_ref(), &requester, post_id, id).await?;
    Ok(ApiResponse::no_content())
}
