use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::permissions::Owned;
use crate::types::UserId;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Comment {
    pub id: i64,
    #[serde(skip)]
    pub author_id: UserId,
    pub author: String,
    #[serde(rename = "post")]
    pub post_id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl Owned for Comment {
    fn author_id(&self) -> UserId {
        self.author_id
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_id: UserId,
    pub post_id: i64,
    pub text: String,
}
