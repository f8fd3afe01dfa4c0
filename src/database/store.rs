use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{Comment, Follow, Group, NewComment, NewGroup, NewPost, Post, PostChanges, User};
use crate::filter::{LimitOffset, SearchTerms};
use crate::types::UserId;

/// Storage contract shared by the Postgres and in-memory backends.
///
/// Implementations own referential integrity:
/// - inserts referencing a missing user, group or post fail with `ForeignKeyViolation`
/// - duplicate usernames, group slugs and follow pairs fail with `UniqueViolation`
/// - deleting a user removes its posts, comments and follows
/// - deleting a post removes its comments
/// - deleting a group clears `group_id` on its posts
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs and the health endpoint
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    // Users
    async fn insert_user(&self, username: &str) -> Result<User, DatabaseError>;
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, DatabaseError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;
    async fn delete_user(&self, id: UserId) -> Result<bool, DatabaseError>;

    // Groups
    async fn insert_group(&self, group: NewGroup) -> Result<Group, DatabaseError>;
    async fn list_groups(&self) -> Result<Vec<Group>, DatabaseError>;
    async fn group_by_id(&self, id: i64) -> Result<Option<Group>, DatabaseError>;
    async fn delete_group(&self, id: i64) -> Result<bool, DatabaseError>;

    // Posts, ordered by id
    async fn count_posts(&self) -> Result<i64, DatabaseError>;
    async fn list_posts(&self, window: Option<LimitOffset>) -> Result<Vec<Post>, DatabaseError>;
    async fn post_by_id(&self, id: i64) -> Result<Option<Post>, DatabaseError>;
    async fn insert_post(&self, post: NewPost) -> Result<Post, DatabaseError>;
    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Post, DatabaseError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DatabaseError>;

    // Comments, always addressed through their post
    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DatabaseError>;
    async fn comment_by_id(&self, post_id: i64, id: i64) -> Result<Option<Comment>, DatabaseError>;
    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, DatabaseError>;
    async fn update_comment(&self, id: i64, text: String) -> Result<Comment, DatabaseError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, DatabaseError>;

    // Follows
    /// Follows where `user_id` is the follower, narrowed to followed usernames
    /// matching every search term
    async fn list_follows(
        &self,
        user_id: UserId,
        search: &SearchTerms,
    ) -> Result<Vec<Follow>, DatabaseError>;
    async fn insert_follow(
        &self,
        user_id: UserId,
        following_id: UserId,
    ) -> Result<Follow, DatabaseError>;
}
