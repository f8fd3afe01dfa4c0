//! Runs against a real database only when DATABASE_URL is set.

use uuid::Uuid;
use yatube_api::config::AppConfig;
use yatube_api::database::models::{NewComment, NewPost, PostChanges};
use yatube_api::database::{DatabaseError, DatabaseManager, PgStore, Store};
use yatube_api::filter::{LimitOffset, SearchTerms};

async fn store() -> Option<PgStore> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping Postgres test");
        return None;
    }
    let config = AppConfig::development();
    let pool = DatabaseManager::connect(&config.database).await.expect("connect");
    DatabaseManager::apply_schema(&pool).await.expect("schema");
    Some(PgStore::new(pool))
}

fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

#[tokio::test]
async fn postgres_store_enforces_constraints() {
    let Some(store) = store().await else { return };
    store.health_check().await.unwrap();

    let leo = store.insert_user(&unique("leo")).await.unwrap();
    let anna = store.insert_user(&unique("anna")).await.unwrap();
    assert!(matches!(
        store.insert_user(&leo.username).await,
        Err(DatabaseError::UniqueViolation(_))
    ));

    let post = store
        .insert_post(NewPost {
            author_id: leo.id,
            text: "hello".into(),
            image: None,
            group_id: None,
        })
        .await
        .unwrap();
    assert_eq!(post.author, leo.username);

    let updated = store
        .update_post(
            post.id,
            PostChanges {
                text: Some("edited".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.text, "edited");
    assert_eq!(updated.pub_date, post.pub_date);

    let comment = store
        .insert_comment(NewComment {
            author_id: anna.id,
            post_id: post.id,
            text: "nice".into(),
        })
        .await
        .unwrap();
    assert!(store.comment_by_id(post.id, comment.id).await.unwrap().is_some());
    assert!(store.comment_by_id(post.id + 1, comment.id).await.unwrap().is_none());

    store.insert_follow(anna.id, leo.id).await.unwrap();
    assert!(matches!(
        store.insert_follow(anna.id, leo.id).await,
        Err(DatabaseError::UniqueViolation(_))
    ));
    let found = store
        .list_follows(anna.id, &SearchTerms::parse(&leo.username[..3].to_uppercase()))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let page = store.list_posts(Some(LimitOffset::new(1, 0))).await.unwrap();
    assert_eq!(page.len(), 1);

    assert!(store.delete_user(leo.id).await.unwrap());
    assert!(store.post_by_id(post.id).await.unwrap().is_none());
    assert!(store.delete_user(anna.id).await.unwrap());
}
