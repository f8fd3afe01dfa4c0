use serde::Serialize;
use sqlx::FromRow;

use crate::types::UserId;

/// "user follows following"; both sides rendered as usernames
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Follow {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub user_id: UserId,
    pub user: String,
    #[serde(skip)]
    pub following_id: UserId,
    pub following: String,
}
