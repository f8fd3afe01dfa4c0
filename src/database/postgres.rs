use async_trait::async_trait;
use sqlx::PgPool;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{Comment, Follow, Group, NewComment, NewGroup, NewPost, Post, PostChanges, User};
use super::store::Store;
use crate::filter::{LimitOffset, SearchTerms};
use crate::types::UserId;

const POST_COLUMNS: &str =
    "p.id, p.author_id, u.username AS author, p.text, p.pub_date, p.image, p.group_id";

const COMMENT_COLUMNS: &str =
    "c.id, c.author_id, u.username AS author, c.post_id, c.text, c.created";

const FOLLOW_COLUMNS: &str =
    "f.id, f.user_id, u.username AS \"user\", f.following_id, t.username AS following";

/// `Store` backed by Postgres; constraints live in `schema.sql`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn insert_user(&self, username: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username) VALUES ($1) RETURNING id, username, date_joined",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, date_joined FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, date_joined FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, date_joined FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_group(&self, group: NewGroup) -> Result<Group, DatabaseError> {
        sqlx::query_as::<_, Group>(
            "INSERT INTO groups (title, slug, description) VALUES ($1, $2, $3)
             RETURNING id, title, slug, description",
        )
        .bind(group.title)
        .bind(group.slug)
        .bind(group.description)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DatabaseError> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn group_by_id(&self, id: i64) -> Result<Option<Group>, DatabaseError> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    async fn delete_group(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_posts(&self) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_posts(&self, window: Option<LimitOffset>) -> Result<Vec<Post>, DatabaseError> {
        let base = format!(
            "SELECT {} FROM posts p JOIN users u ON u.id = p.author_id ORDER BY p.id",
            POST_COLUMNS
        );
        let posts = match window {
            Some(LimitOffset { limit, offset }) => {
                sqlx::query_as::<_, Post>(&format!("{} LIMIT $1 OFFSET $2", base))
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => sqlx::query_as::<_, Post>(&base).fetch_all(&self.pool).await?,
        };
        Ok(posts)
    }

    async fn post_by_id(&self, id: i64) -> Result<Option<Post>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM posts p JOIN users u ON u.id = p.author_id WHERE p.id = $1",
            POST_COLUMNS
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, DatabaseError> {
        let sql = format!(
            "WITH p AS (
                INSERT INTO posts (text, author_id, image, group_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {} FROM p JOIN users u ON u.id = p.author_id",
            POST_COLUMNS
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(post.text)
            .bind(post.author_id)
            .bind(post.image)
            .bind(post.group_id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Post, DatabaseError> {
        let sql = format!(
            "WITH p AS (
                UPDATE posts SET
                    text = COALESCE($2, text),
                    image = CASE WHEN $3 THEN $4 ELSE image END,
                    group_id = CASE WHEN $5 THEN $6 ELSE group_id END
                WHERE id = $1
                RETURNING *
            )
            SELECT {} FROM p JOIN users u ON u.id = p.author_id",
            POST_COLUMNS
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(changes.text)
            .bind(changes.image.is_some())
            .bind(changes.image.flatten())
            .bind(changes.group_id.is_some())
            .bind(changes.group_id.flatten())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        post.ok_or_else(|| DatabaseError::NotFound(format!("post {}", id)))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.post_id = $1 ORDER BY c.id",
            COMMENT_COLUMNS
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn comment_by_id(&self, post_id: i64, id: i64) -> Result<Option<Comment>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM comments c JOIN users u ON u.id = c.author_id
             WHERE c.post_id = $1 AND c.id = $2",
            COMMENT_COLUMNS
        );
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, DatabaseError> {
        let sql = format!(
            "WITH c AS (
                INSERT INTO comments (author_id, post_id, text)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT {} FROM c JOIN users u ON u.id = c.author_id",
            COMMENT_COLUMNS
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(comment.author_id)
            .bind(comment.post_id)
            .bind(comment.text)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    async fn update_comment(&self, id: i64, text: String) -> Result<Comment, DatabaseError> {
        let sql = format!(
            "WITH c AS (
                UPDATE comments SET text = $2 WHERE id = $1 RETURNING *
            )
            SELECT {} FROM c JOIN users u ON u.id = c.author_id",
            COMMENT_COLUMNS
        );
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .bind(text)
            .fetch_optional(&self.pool)
            .await?;

        comment.ok_or_else(|| DatabaseError::NotFound(format!("comment {}", id)))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_follows(
        &self,
        user_id: UserId,
        search: &SearchTerms,
    ) -> Result<Vec<Follow>, DatabaseError> {
        // ILIKE ALL over an empty array is true, so no terms means no filter
        let sql = format!(
            "SELECT {} FROM follows f
             JOIN users u ON u.id = f.user_id
             JOIN users t ON t.id = f.following_id
             WHERE f.user_id = $1 AND t.username ILIKE ALL($2)
             ORDER BY f.id",
            FOLLOW_COLUMNS
        );
        let follows = sqlx::query_as::<_, Follow>(&sql)
            .bind(user_id)
            .bind(search.like_patterns())
            .fetch_all(&self.pool)
            .await?;
        Ok(follows)
    }

    async fn insert_follow(
        &self,
        user_id: UserId,
        following_id: UserId,
    ) -> Result<Follow, DatabaseError> {
        let sql = format!(
            "WITH f AS (
                INSERT INTO follows (user_id, following_id)
                VALUES ($1, $2)
                RETURNING *
            )
            SELECT {} FROM f
            JOIN users u ON u.id = f.user_id
            JOIN users t ON t.id = f.following_id",
            FOLLOW_COLUMNS
        );
        sqlx::query_as::<_, Follow>(&sql)
            .bind(user_id)
            .bind(following_id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)
    }
}
