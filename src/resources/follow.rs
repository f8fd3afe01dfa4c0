use serde::Deserialize;

use super::{required_text, FIELD_REQUIRED};
use crate::database::models::Follow;
use crate::database::{DatabaseError, Store};
use crate::error::ApiError;
use crate::filter::SearchTerms;
use crate::types::Requester;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FollowPayload {
    pub following: Option<String>,
}

/// The requester's own subscriptions, optionally narrowed by `search`
pub async fn list(
    store: &dyn Store,
    requester: &Requester,
    search: &SearchTerms,
) -> Result<Vec<Follow>, ApiError> {
    Ok(store.list_follows(requester.id, search).await?)
}

pub async fn create(
    store: &dyn Store,
    requester: &Requester,
    payload: FollowPayload,
) -> Result<Follow, ApiError> {
    let username = required_text("following", payload.following)
        .map_err(|_| ApiError::field_error("following", FIELD_REQUIRED))?;

    let target = store.user_by_username(&username).await?.ok_or_else(|| {
        ApiError::field_error(
            "following",
            format!("Object with username={} does not exist.", username),
        )
    })?;

    if target.id == requester.id {
        return Err(ApiError::field_error("following", "You cannot follow yourself."));
    }

    let follow = store
        .insert_follow(requester.id, target.id)
        .await
        .map_err(|err| match err {
            DatabaseError::UniqueViolation(_) => {
                ApiError::conflict(format!("You are already following {}.", target.username))
            }
            other => other.into(),
        })?;

    tracing::info!("User {} now follows {}", requester.username, target.username);
    Ok(follow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use axum::http::StatusCode;

    fn following(name: &str) -> FollowPayload {
        FollowPayload {
            following: Some(name.to_string()),
        }
    }

    #[tokio::test]
    async fn follow_then_list() {
        let fx = Fixture::new().await;
        let follow = create(fx.store(), &fx.leo, following("anna")).await.unwrap();
        assert_eq!(follow.user, "leo");
        assert_eq!(follow.following, "anna");

        let mine = list(fx.store(), &fx.leo, &SearchTerms::default()).await.unwrap();
        assert_eq!(mine.len(), 1);

        // Follows are per requester
        let theirs = list(fx.store(), &fx.anna, &SearchTerms::default()).await.unwrap();
        assert!(theirs.is_empty());
    }

    #[tokio::test]
    async fn duplicate_follow_conflicts() {
        let fx = Fixture::new().await;
        create(fx.store(), &fx.leo, following("anna")).await.unwrap();

        let err = create(fx.store(), &fx.leo, following("anna")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn invalid_targets_are_validation_errors() {
        let fx = Fixture::new().await;
        for payload in [following("leo"), following("nobody"), FollowPayload::default()] {
            let err = create(fx.store(), &fx.leo, payload).await.unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn search_narrows_by_followed_username() {
        let fx = Fixture::new().await;
        fx.store().insert_user("annabel").await.unwrap();
        create(fx.store(), &fx.leo, following("anna")).await.unwrap();
        create(fx.store(), &fx.leo, following("annabel")).await.unwrap();

        let hits = list(fx.store(), &fx.leo, &SearchTerms::parse("BEL")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].following, "annabel");
    }
}
