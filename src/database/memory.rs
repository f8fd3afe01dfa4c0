use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{Comment, Follow, Group, NewComment, NewGroup, NewPost, Post, PostChanges, User};
use super::store::Store;
use crate::filter::{LimitOffset, SearchTerms};
use crate::types::UserId;

/// Rows as they are kept in memory: foreign keys only, usernames joined on read
#[derive(Debug, Clone)]
struct PostRow {
    text: String,
    pub_date: chrono::DateTime<Utc>,
    author_id: UserId,
    image: Option<String>,
    group_id: Option<i64>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    author_id: UserId,
    post_id: i64,
    text: String,
    created: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct FollowRow {
    user_id: UserId,
    following_id: UserId,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<UserId, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, PostRow>,
    comments: BTreeMap<i64, CommentRow>,
    follows: BTreeMap<i64, FollowRow>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn username(&self, id: UserId) -> String {
        self.users
            .get(&id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn post(&self, id: i64, row: &PostRow) -> Post {
        Post {
            id,
            author_id: row.author_id,
            author: self.username(row.author_id),
            text: row.text.clone(),
            pub_date: row.pub_date,
            image: row.image.clone(),
            group_id: row.group_id,
        }
    }

    fn comment(&self, id: i64, row: &CommentRow) -> Comment {
        Comment {
            id,
            author_id: row.author_id,
            author: self.username(row.author_id),
            post_id: row.post_id,
            text: row.text.clone(),
            created: row.created,
        }
    }

    fn follow(&self, id: i64, row: FollowRow) -> Follow {
        Follow {
            id,
            user_id: row.user_id,
            user: self.username(row.user_id),
            following_id: row.following_id,
            following: self.username(row.following_id),
        }
    }

    fn require_user(&self, id: UserId) -> Result<(), DatabaseError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(DatabaseError::ForeignKeyViolation(format!("user {} does not exist", id)))
        }
    }

    fn require_group(&self, id: Option<i64>) -> Result<(), DatabaseError> {
        match id {
            Some(id) if !self.groups.contains_key(&id) => Err(
                DatabaseError::ForeignKeyViolation(format!("group {} does not exist", id)),
            ),
            _ => Ok(()),
        }
    }

    fn remove_post(&mut self, id: i64) -> bool {
        let removed = self.posts.remove(&id).is_some();
        if removed {
            self.comments.retain(|_, c| c.post_id != id);
        }
        removed
    }
}

/// In-process `Store` with the same constraint and cascade rules as the Postgres schema.
///
/// Every call takes the table lock once, so check-then-write sequences are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_user(&self, username: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(DatabaseError::UniqueViolation("users_username_key".to_string()));
        }
        let user = User {
            id: tables.next_id(),
            username: username.to_string(),
            date_joined: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }

        let authored: Vec<i64> = tables
            .posts
            .iter()
            .filter(|(_, p)| p.author_id == id)
            .map(|(post_id, _)| *post_id)
            .collect();
        for post_id in authored {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
        tables
            .follows
            .retain(|_, f| f.user_id != id && f.following_id != id);
        Ok(true)
    }

    async fn insert_group(&self, group: NewGroup) -> Result<Group, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|g| g.slug == group.slug) {
            return Err(DatabaseError::UniqueViolation("groups_slug_key".to_string()));
        }
        let group = Group {
            id: tables.next_id(),
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DatabaseError> {
        Ok(self.tables.read().await.groups.values().cloned().collect())
    }

    async fn group_by_id(&self, id: i64) -> Result<Option<Group>, DatabaseError> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn delete_group(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.groups.remove(&id).is_none() {
            return Ok(false);
        }
        for post in tables.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(true)
    }

    async fn count_posts(&self) -> Result<i64, DatabaseError> {
        Ok(self.tables.read().await.posts.len() as i64)
    }

    async fn list_posts(&self, window: Option<LimitOffset>) -> Result<Vec<Post>, DatabaseError> {
        let tables = self.tables.read().await;
        let all = tables.posts.iter().map(|(id, row)| tables.post(*id, row));
        Ok(match window {
            Some(window) => window.apply(all),
            None => all.collect(),
        })
    }

    async fn post_by_id(&self, id: i64) -> Result<Option<Post>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|row| tables.post(id, row)))
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.require_user(post.author_id)?;
        tables.require_group(post.group_id)?;

        let id = tables.next_id();
        let row = PostRow {
            text: post.text,
            pub_date: Utc::now(),
            author_id: post.author_id,
            image: post.image,
            group_id: post.group_id,
        };
        let created = tables.post(id, &row);
        tables.posts.insert(id, row);
        Ok(created)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Post, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(group_id) = changes.group_id {
            tables.require_group(group_id)?;
        }

        let row = tables
            .posts
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("post {}", id)))?;
        if let Some(text) = changes.text {
            row.text = text;
        }
        if let Some(image) = changes.image {
            row.image = image;
        }
        if let Some(group_id) = changes.group_id {
            row.group_id = group_id;
        }

        let row = row.clone();
        Ok(tables.post(id, &row))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.remove_post(id))
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|(_, c)| c.post_id == post_id)
            .map(|(id, row)| tables.comment(*id, row))
            .collect())
    }

    async fn comment_by_id(&self, post_id: i64, id: i64) -> Result<Option<Comment>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .get(&id)
            .filter(|c| c.post_id == post_id)
            .map(|row| tables.comment(id, row)))
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.require_user(comment.author_id)?;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }

        let id = tables.next_id();
        let row = CommentRow {
            author_id: comment.author_id,
            post_id: comment.post_id,
            text: comment.text,
            created: Utc::now(),
        };
        let created = tables.comment(id, &row);
        tables.comments.insert(id, row);
        Ok(created)
    }

    async fn update_comment(&self, id: i64, text: String) -> Result<Comment, DatabaseError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .comments
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("comment {}", id)))?;
        row.text = text;

        let row = row.clone();
        Ok(tables.comment(id, &row))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }

    async fn list_follows(
        &self,
        user_id: UserId,
        search: &SearchTerms,
    ) -> Result<Vec<Follow>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .filter(|(_, f)| f.user_id == user_id)
            .map(|(id, row)| tables.follow(*id, *row))
            .filter(|f| search.matches(&f.following))
            .collect())
    }

    async fn insert_follow(
        &self,
        user_id: UserId,
        following_id: UserId,
    ) -> Result<Follow, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id)?;
        tables.require_user(following_id)?;
        if tables
            .follows
            .values()
            .any(|f| f.user_id == user_id && f.following_id == following_id)
        {
            return Err(DatabaseError::UniqueViolation("unique_follow".to_string()));
        }

        let id = tables.next_id();
        let row = FollowRow {
            user_id,
            following_id,
        };
        tables.follows.insert(id, row);
        Ok(tables.follow(id, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, User, User) {
        let store = MemoryStore::new();
        let leo = store.insert_user("leo").await.unwrap();
        let anna = store.insert_user("anna").await.unwrap();
        (store, leo, anna)
    }

    fn new_post(author_id: UserId, group_id: Option<i64>) -> NewPost {
        NewPost {
            author_id,
            text: "War and Peace".to_string(),
            image: None,
            group_id,
        }
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let (store, _, _) = seeded().await;
        let err = store.insert_user("leo").await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn group_slugs_are_unique() {
        let store = MemoryStore::new();
        let group = NewGroup {
            title: "Novels".into(),
            slug: "novels".into(),
            description: "Long prose".into(),
        };
        store.insert_group(group.clone()).await.unwrap();
        let err = store.insert_group(group).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn post_requires_existing_group() {
        let (store, leo, _) = seeded().await;
        let err = store.insert_post(new_post(leo.id, Some(999))).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn follow_pairs_are_unique() {
        let (store, leo, anna) = seeded().await;
        store.insert_follow(leo.id, anna.id).await.unwrap();
        let err = store.insert_follow(leo.id, anna.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));

        // The reverse direction is a different pair
        store.insert_follow(anna.id, leo.id).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_post_cascades_to_comments() {
        let (store, leo, anna) = seeded().await;
        let post = store.insert_post(new_post(leo.id, None)).await.unwrap();
        store
            .insert_comment(NewComment {
                author_id: anna.id,
                post_id: post.id,
                text: "Too long".into(),
            })
            .await
            .unwrap();

        assert!(store.delete_post(post.id).await.unwrap());
        assert!(store.list_comments(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_user_cascades_everywhere() {
        let (store, leo, anna) = seeded().await;
        let leo_post = store.insert_post(new_post(leo.id, None)).await.unwrap();
        let anna_post = store.insert_post(new_post(anna.id, None)).await.unwrap();
        store
            .insert_comment(NewComment {
                author_id: leo.id,
                post_id: anna_post.id,
                text: "Nice".into(),
            })
            .await
            .unwrap();
        store.insert_follow(anna.id, leo.id).await.unwrap();

        assert!(store.delete_user(leo.id).await.unwrap());

        assert!(store.post_by_id(leo_post.id).await.unwrap().is_none());
        assert!(store.post_by_id(anna_post.id).await.unwrap().is_some());
        assert!(store.list_comments(anna_post.id).await.unwrap().is_empty());
        let follows = store.list_follows(anna.id, &SearchTerms::default()).await.unwrap();
        assert!(follows.is_empty());
    }

    #[tokio::test]
    async fn deleting_group_detaches_posts() {
        let (store, leo, _) = seeded().await;
        let group = store
            .insert_group(NewGroup {
                title: "Novels".into(),
                slug: "novels".into(),
                description: String::new(),
            })
            .await
            .unwrap();
        let post = store.insert_post(new_post(leo.id, Some(group.id))).await.unwrap();

        assert!(store.delete_group(group.id).await.unwrap());
        let post = store.post_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(post.group_id, None);
    }

    #[tokio::test]
    async fn comments_are_addressed_through_their_post() {
        let (store, leo, _) = seeded().await;
        let first = store.insert_post(new_post(leo.id, None)).await.unwrap();
        let second = store.insert_post(new_post(leo.id, None)).await.unwrap();
        let comment = store
            .insert_comment(NewComment {
                author_id: leo.id,
                post_id: first.id,
                text: "mine".into(),
            })
            .await
            .unwrap();

        assert!(store.comment_by_id(first.id, comment.id).await.unwrap().is_some());
        assert!(store.comment_by_id(second.id, comment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partial_update_leaves_untouched_columns() {
        let (store, leo, _) = seeded().await;
        let post = store
            .insert_post(NewPost {
                image: Some("/media/posts/a.png".into()),
                ..new_post(leo.id, None)
            })
            .await
            .unwrap();

        let updated = store
            .update_post(
                post.id,
                PostChanges {
                    text: Some("Anna Karenina".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.text, "Anna Karenina");
        assert_eq!(updated.image.as_deref(), Some("/media/posts/a.png"));
        assert_eq!(updated.pub_date, post.pub_date);
        assert_eq!(updated.author, "leo");
    }
}
