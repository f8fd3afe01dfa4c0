use axum::extract::{Extension, State};

use crate::database::models::Follow;
use crate::filter::SearchQuery;
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult};
use crate::resources::follow::{self, FollowPayload};
use crate::server::AppState;
use crate::types::Requester;

/// GET /api/v1/follow/?search=
pub async fn list(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<Vec<Follow>> {
    let follows = follow::list(state.store.as_ref(), &requester, &query.terms()).await?;
    Ok(ApiResponse::success(follows))
}

/// POST /api/v1/follow/
pub async fn create(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    ApiJson(payload): ApiJson<FollowPayload>,
) -> ApiResult<Follow> {
    let follow = follow::create(state.store.as_ref(), &requester, payload).await?;
    Ok(ApiResponse::created(follow))
}
