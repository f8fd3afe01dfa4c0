use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::permissions::Owned;
use crate::types::UserId;

/// A post as stored, joined with its author's username.
///
/// Serializes to the public representation: `author` is the username and
/// `group` is the group id.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    #[serde(skip)]
    pub author_id: UserId,
    pub author: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    #[serde(rename = "group")]
    pub group_id: Option<i64>,
}

impl Owned for Post {
    fn author_id(&self) -> UserId {
        self.author_id
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: UserId,
    pub text: String,
    pub image: Option<String>,
    pub group_id: Option<i64>,
}

/// Column changes for an update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub text: Option<String>,
    pub image: Option<Option<String>>,
    pub group_id: Option<Option<i64>>,
}
