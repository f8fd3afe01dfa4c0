use tempfile::TempDir;

use crate::database::models::{Group, NewGroup, NewPost, Post};
use crate::database::{MemoryStore, Store};
use crate::media::MediaStore;
use crate::types::Requester;

/// In-memory store with two users, `leo` and `anna`, and a scratch media root
pub struct Fixture {
    store: MemoryStore,
    pub media: MediaStore,
    pub leo: Requester,
    pub anna: Requester,
    media_dir: TempDir,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let leo = store.insert_user("leo").await.expect("seed leo");
        let anna = store.insert_user("anna").await.expect("seed anna");

        let media_dir = tempfile::tempdir().expect("media tempdir");
        let media = MediaStore::new(media_dir.path(), "/media");

        Self {
            store,
            media,
            leo: Requester::new(leo.id, leo.username),
            anna: Requester::new(anna.id, anna.username),
            media_dir,
        }
    }

    pub fn store(&self) -> &dyn Store {
        &self.store
    }

    /// Number of files written under the post image directory
    pub fn stored_images(&self) -> usize {
        std::fs::read_dir(self.media_dir.path().join("posts"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn post(&self, author: &Requester, text: &str) -> Post {
        self.store
            .insert_post(NewPost {
                author_id: author.id,
                text: text.to_string(),
                image: None,
                group_id: None,
            })
            .await
            .expect("seed post")
    }

    pub async fn group(&self, slug: &str) -> Group {
        self.store
            .insert_group(NewGroup {
                title: slug.to_uppercase(),
                slug: slug.to_string(),
                description: format!("All about {}", slug),
            })
            .await
            .expect("seed group")
    }
}
