use axum::http::Method;
use serde::Deserialize;

use super::{double_option, optional_text, required_text};
use crate::database::models::{NewPost, Post, PostChanges};
use crate::database::Store;
use crate::error::ApiError;
use crate::filter::{LimitOffset, Listing, Page};
use crate::media::MediaStore;
use crate::permissions::{check_object_permission, ensure_author};
use crate::types::Requester;

pub const EDIT_FORBIDDEN: &str = "Editing another user's post is forbidden!";

/// Subdirectory of the media root that post images are written to
const IMAGE_DIR: &str = "posts";

/// Inbound post fields. `author`, `pub_date` and anything else are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPayload {
    pub text: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub group: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
}

pub async fn list(
    store: &dyn Store,
    window: Option<LimitOffset>,
    base_path: &str,
) -> Result<Listing<Post>, ApiError> {
    match window {
        Some(window) => {
            let count = store.count_posts().await?;
            let results = store.list_posts(Some(window)).await?;
            Ok(Listing::Page(Page::new(results, count, window, base_path)))
        }
        None => Ok(Listing::All(store.list_posts(None).await?)),
    }
}

pub async fn retrieve(store: &dyn Store, id: i64) -> Result<Post, ApiError> {
    store
        .post_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {} not found", id)))
}

/// The author is always the requester, whatever the payload says
pub async fn create(
    store: &dyn Store,
    media: &MediaStore,
    requester: &Requester,
    payload: PostPayload,
) -> Result<Post, ApiError> {
    let text = required_text("text", payload.text)?;
    let group_id = match payload.group {
        Some(group) => validate_group(store, group).await?,
        None => None,
    };
    let image = match payload.image {
        Some(image) => store_image(media, image).await?,
        None => None,
    };

    let stored = image.clone();
    let post = match store
        .insert_post(NewPost {
            author_id: requester.id,
            text,
            image,
            group_id,
        })
        .await
    {
        Ok(post) => post,
        Err(err) => {
            discard_image(media, stored).await;
            return Err(err.into());
        }
    };

    tracing::info!("User {} created post {}", requester.username, post.id);
    Ok(post)
}

/// PUT (`partial == false`) or PATCH (`partial == true`)
pub async fn update(
    store: &dyn Store,
    media: &MediaStore,
    requester: &Requester,
    id: i64,
    payload: PostPayload,
    partial: bool,
) -> Result<Post, ApiError> {
    let post = retrieve(store, id).await?;
    let method = if partial { Method::PATCH } else { Method::PUT };
    check_object_permission(&method, requester, &post)?;

    perform_update(store, media, requester, &post, payload, partial).await
}

/// Write an update to a fetched post.
///
/// Re-checks authorship on its own, answering with `EDIT_FORBIDDEN` rather
/// than the generic policy denial.
pub async fn perform_update(
    store: &dyn Store,
    media: &MediaStore,
    requester: &Requester,
    post: &Post,
    payload: PostPayload,
    partial: bool,
) -> Result<Post, ApiError> {
    if let Err(err) = ensure_author(requester, post, EDIT_FORBIDDEN) {
        tracing::warn!(
            "User {} tried to edit post {} of {}",
            requester.username,
            post.id,
            post.author
        );
        return Err(err);
    }

    let text = if partial {
        optional_text("text", payload.text)?
    } else {
        Some(required_text("text", payload.text)?)
    };
    let group_id = match payload.group {
        Some(group) => Some(validate_group(store, group).await?),
        None => None,
    };
    let image = match payload.image {
        Some(image) => Some(store_image(media, image).await?),
        None => None,
    };

    let stored = image.clone().flatten();
    match store
        .update_post(post.id, PostChanges { text, image, group_id })
        .await
    {
        Ok(updated) => Ok(updated),
        Err(err) => {
            discard_image(media, stored).await;
            Err(err.into())
        }
    }
}

pub async fn destroy(store: &dyn Store, requester: &Requester, id: i64) -> Result<(), ApiError> {
    let post = retrieve(store, id).await?;
    check_object_permission(&Method::DELETE, requester, &post)?;

    if !store.delete_post(post.id).await? {
        return Err(ApiError::not_found(format!("Post {} not found", id)));
    }
    tracing::info!("User {} deleted post {}", requester.username, post.id);
    Ok(())
}

async fn validate_group(store: &dyn Store, group: Option<i64>) -> Result<Option<i64>, ApiError> {
    match group {
        Some(id) => match store.group_by_id(id).await? {
            Some(_) => Ok(Some(id)),
            None => Err(ApiError::field_error(
                "group",
                format!("Invalid pk \"{}\" - object does not exist.", id),
            )),
        },
        None => Ok(None),
    }
}

/// Empty strings and null clear the image
async fn store_image(
    media: &MediaStore,
    image: Option<String>,
) -> Result<Option<String>, ApiError> {
    match image {
        Some(data) if !data.trim().is_empty() => {
            Ok(Some(media.save_data_uri(&data, IMAGE_DIR).await?))
        }
        _ => Ok(None),
    }
}

/// Drop an image written for a row that was never saved
async fn discard_image(media: &MediaStore, url: Option<String>) {
    if let Some(url) = url {
        media.discard(&url).await;
    }
}
