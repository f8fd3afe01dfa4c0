use crate::database::models::Group;
use crate::database::Store;
use crate::error::ApiError;

/// Groups are read-only over the API; they are managed from the CLI
pub async fn list(store: &dyn Store) -> Result<Vec<Group>, ApiError> {
    Ok(store.list_groups().await?)
}

pub async fn retrieve(store: &dyn Store, id: i64) -> Result<Group, ApiError> {
    store
        .group_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Group {} not found", id)))
}
