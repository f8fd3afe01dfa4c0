use axum::extract::State;

use crate::database::models::Group;
use crate::middleware::{ApiPath, ApiResponse, ApiResult};
use crate::resources::group;
use crate::server::AppState;

/// GET /api/v1/groups/
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Group>> {
    let groups = group::list(state.store.as_ref()).await?;
    Ok(ApiResponse::success(groups))
}

/// GET /api/v1/groups/:id/
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Group> {
    let group = group::retrieve(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(group))
}
