use axum::http::Method;
use serde::Deserialize;

use super::{optional_text, required_text};
use crate::database::models::{Comment, NewComment, Post};
use crate::database::Store;
use crate::error::ApiError;
use crate::permissions::{check_object_permission, ensure_author};
use crate::types::Requester;

pub const EDIT_FORBIDDEN: &str = "Editing another user's comment is forbidden!";

/// Inbound comment fields. `post` and `author` come from the path and token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPayload {
    pub text: Option<String>,
}

/// Every comment operation starts here: an unknown post is a 404 before
/// anything else is looked at
async fn parent_post(store: &dyn Store, post_id: i64) -> Result<Post, ApiError> {
    store
        .post_by_id(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {} not found", post_id)))
}

async fn scoped(store: &dyn Store, post_id: i64, id: i64) -> Result<Comment, ApiError> {
    let post = parent_post(store, post_id).await?;
    store
        .comment_by_id(post.id, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Comment {} not found on post {}", id, post_id)))
}

pub async fn list(store: &dyn Store, post_id: i64) -> Result<Vec<Comment>, ApiError> {
    let post = parent_post(store, post_id).await?;
    Ok(store.list_comments(post.id).await?)
}

pub async fn retrieve(store: &dyn Store, post_id: i64, id: i64) -> Result<Comment, ApiError> {
    scoped(store, post_id, id).await
}

pub async fn create(
    store: &dyn Store,
    requester: &Requester,
    post_id: i64,
    payload: CommentPayload,
) -> Result<Comment, ApiError> {
    let post = parent_post(store, post_id).await?;
    let text = required_text("text", payload.text)?;

    let comment = store
        .insert_comment(NewComment {
            author_id: requester.id,
            post_id: post.id,
            text,
        })
        .await?;

    tracing::info!(
        "User {} commented on post {} ({})",
        requester.username,
        post.id,
        comment.id
    );
    Ok(comment)
}

pub async fn update(
    store: &dyn Store,
    requester: &Requester,
    post_id: i64,
    id: i64,
    payload: CommentPayload,
    partial: bool,
) -> Result<Comment, ApiError> {
    let comment = scoped(store, post_id, id).await?;
    let method = if partial { Method::PATCH } else { Method::PUT };
    check_object_permission(&method, requester, &comment)?;

    perform_update(store, requester, comment, payload, partial).await
}

/// Write an update to a fetched comment, re-checking authorship with the
/// comment-specific message
pub async fn perform_update(
    store: &dyn Store,
    requester: &Requester,
    comment: Comment,
    payload: CommentPayload,
    partial: bool,
) -> Result<Comment, ApiError> {
    ensure_author(requester, &comment, EDIT_FORBIDDEN)?;

    let text = if partial {
        optional_text("text", payload.text)?
    } else {
        Some(required_text("text", payload.text)?)
    };

    match text {
        Some(text) => Ok(store.update_comment(comment.id, text).await?),
        None => Ok(comment),
    }
}

pub async fn destroy(
    store: &dyn Store,
    requester: &Requester,
    post_id: i64,
    id: i64,
) -> Result<(), ApiError> {
    let comment = scoped(store, post_id, id).await?;
    check_object_permission(&Method::DELETE, requester, &comment)?;

    store.delete_comment(comment.id).await?;
    tracing::info!("User {} deleted comment {}", requester.username, comment.id);
    Ok(())
}
