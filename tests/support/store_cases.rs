// tests/support/store_cases.rs
//! Behavior shared by every durable adapter. Each case writes into its own
//! blog keys under `prefix`, so runs against a shared server do not collide
//! and can be cleaned up by prefix.
use super::builders::BlogPostBuilder;
use super::mocks::fixed_now;
use chrono::Duration;
use quill_core::domain::errors::DomainError;
use quill_core::domain::post::{
    BlogKey, BlogPost, BlogPostReadRepository, BlogPostWriteRepository, BlogQuery, PostId, Slug,
};
use std::sync::Arc;

/// Adapter under test; both halves must share the storage and use a clock
/// fixed at [`fixed_now`].
pub struct Store {
    pub read: Arc<dyn BlogPostReadRepository>,
    pub write: Arc<dyn BlogPostWriteRepository>,
}

/// Unique prefix for one test run.
pub fn run_prefix(label: &str) -> String {
    format!("{label}{}", PostId::generate())
}

fn blog(prefix: &str, name: &str) -> BlogKey {
    BlogKey::new(format!("{prefix}-{name}")).unwrap()
}

fn post(blog_key: &BlogKey, name: &str) -> BlogPostBuilder {
    BlogPostBuilder::new(&format!("{blog_key}-{name}")).in_blog(blog_key)
}

fn hours_ago(hours: i64) -> chrono::DateTime<chrono::Utc> {
    fixed_now() - Duration::hours(hours)
}

async fn save(store: &Store, post: BlogPost) -> BlogPost {
    store.write.upsert(post).await.unwrap()
}

pub async fn query_filters_by_tag_and_search_and_pages(store: &Store, prefix: &str) {
    let key = blog(prefix, "query");
    for n in 0..5 {
        save(
            store,
            post(&key, &format!("rust-{n}"))
                .titled(&format!("Rust tips {n}"))
                .tagged(&["Rust", "news"])
                .published_at(hours_ago(10 - n))
                .build(),
        )
        .await;
    }
    for n in 0..2 {
        save(
            store,
            post(&key, &format!("garden-{n}"))
                .titled(&format!("Garden {n}"))
                .with_content("Tomatoes need 100% sun")
                .tagged(&["garden"])
                .published_at(hours_ago(3 - n))
                .build(),
        )
        .await;
    }
    save(
        store,
        post(&key, "rust-draft")
            .titled("Rust draft")
            .tagged(&["rust"])
            .build(),
    )
    .await;

    let mut seen = Vec::new();
    for page in 1..=3 {
        let result = store
            .read
            .query(&BlogQuery {
                tag: Some("RUST".into()),
                page,
                page_size: 2,
                ..BlogQuery::for_blog(key.as_str())
            })
            .await
            .unwrap();
        assert_eq!(result.total_count, 5);
        seen.extend(result.items.into_iter().map(|p| p.title));
    }
    assert_eq!(
        seen,
        vec!["Rust tips 4", "Rust tips 3", "Rust tips 2", "Rust tips 1", "Rust tips 0"]
    );

    let tips = store
        .read
        .query(&BlogQuery {
            tag: Some("rust".into()),
            search_term: Some("TIPS 3".into()),
            ..BlogQuery::for_blog(key.as_str())
        })
        .await
        .unwrap();
    assert_eq!(tips.total_count, 1);

    // Wildcards in the search term are literal.
    let percent = store
        .read
        .query(&BlogQuery {
            search_term: Some("100%".into()),
            ..BlogQuery::for_blog(key.as_str())
        })
        .await
        .unwrap();
    assert_eq!(percent.total_count, 2);
    let underscore = store
        .read
        .query(&BlogQuery {
            search_term: Some("rust_tips".into()),
            ..BlogQuery::for_blog(key.as_str())
        })
        .await
        .unwrap();
    assert_eq!(underscore.total_count, 0);

    let admin = store
        .read
        .query(&BlogQuery {
            tag: Some("rust".into()),
            include_unpublished: true,
            ..BlogQuery::for_blog(key.as_str())
        })
        .await
        .unwrap();
    assert_eq!(admin.total_count, 6);
}

pub async fn slug_collisions_are_conflicts(store: &Store, prefix: &str) {
    let key = blog(prefix, "slugs");
    let first = save(store, post(&key, "first").with_slug("shared").build()).await;

    let clash = store
        .write
        .upsert(post(&key, "second").with_slug("shared").build())
        .await
        .unwrap_err();
    assert!(matches!(clash, DomainError::Conflict(_)), "{clash:?}");

    let elsewhere = blog(prefix, "slugs-other");
    save(store, post(&elsewhere, "second").with_slug("shared").build()).await;

    // Saving the owner again keeps its slug; renaming it frees the old one.
    let mut renamed = save(store, first).await;
    renamed.slug = Slug::new("renamed").unwrap();
    save(store, renamed).await;
    let taken_over = save(store, post(&key, "second").with_slug("shared").build()).await;

    let found = store
        .read
        .find_by_slug(&key, &Slug::new("shared").unwrap(), true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, taken_over.id);
}

pub async fn ids_owned_by_another_blog_are_conflicts(store: &Store, prefix: &str) {
    let home = blog(prefix, "home");
    let stranger = blog(prefix, "stranger");
    let original = save(store, post(&home, "owned").build()).await;

    let mut hijack = original.clone();
    hijack.blog_key = stranger.clone();
    hijack.title = "Not yours".into();
    let err = store.write.upsert(hijack).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)), "{err:?}");

    assert!(
        store
            .read
            .find_by_id(&stranger, &original.id)
            .await
            .unwrap()
            .is_none()
    );
    let kept = store
        .read
        .find_by_id(&home, &original.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.title, original.title);
}

pub async fn drafts_are_removed_and_published_posts_are_marked(store: &Store, prefix: &str) {
    let key = blog(prefix, "delete");
    let draft = save(store, post(&key, "draft").with_slug("gone").build()).await;
    let live = save(
        store,
        post(&key, "live")
            .with_slug("live")
            .published_at(hours_ago(1))
            .build(),
    )
    .await;

    store.write.delete(&key, &draft.id, "admin").await.unwrap();
    store.write.delete(&key, &live.id, "admin").await.unwrap();

    assert!(store.read.find_by_id(&key, &draft.id).await.unwrap().is_none());
    let marked = store
        .read
        .find_by_id(&key, &live.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(marked.deleted_by.as_deref(), Some("admin"));
    assert_eq!(marked.deleted_utc, Some(fixed_now()));

    let slug = Slug::new("live").unwrap();
    assert!(store.read.find_by_slug(&key, &slug, false).await.unwrap().is_none());
    assert!(store.read.find_by_slug(&key, &slug, true).await.unwrap().is_some());
    let public = store
        .read
        .query(&BlogQuery::for_blog(key.as_str()))
        .await
        .unwrap();
    assert_eq!(public.total_count, 0);
    let scanned = store
        .read
        .scan_published_after(&key, fixed_now(), None, 10)
        .await
        .unwrap();
    assert!(scanned.is_empty());

    // The first marker wins, missing ids are a no-op, and a removed draft
    // frees its slug.
    store.write.delete(&key, &live.id, "someone-else").await.unwrap();
    let still = store
        .read
        .find_by_id(&key, &live.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still.deleted_by.as_deref(), Some("admin"));
    store
        .write
        .delete(&key, &PostId::new(format!("{key}-missing")).unwrap(), "admin")
        .await
        .unwrap();
    save(store, post(&key, "reuse").with_slug("gone").build()).await;
}

pub async fn scan_resumes_after_the_cursor(store: &Store, prefix: &str) {
    let key = blog(prefix, "scan");
    for n in 0..5 {
        save(
            store,
            post(&key, &format!("hourly-{n}"))
                .published_at(hours_ago(6 - n))
                .build(),
        )
        .await;
    }
    // Two posts sharing one publish instant.
    for name in ["tie-a", "tie-b"] {
        save(store, post(&key, name).published_at(hours_ago(3)).build()).await;
    }
    save(
        store,
        post(&key, "scheduled")
            .published_at(fixed_now() + Duration::hours(1))
            .build(),
    )
    .await;
    save(store, post(&key, "unfinished").build()).await;

    let everything = store
        .read
        .scan_published_after(&key, fixed_now(), None, 100)
        .await
        .unwrap();
    assert_eq!(everything.len(), 7);
    let positions: Vec<_> = everything
        .iter()
        .map(|post| post.published_cursor().unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

    let mut resumed = Vec::new();
    let mut cursor = None;
    loop {
        let batch = store
            .read
            .scan_published_after(&key, fixed_now(), cursor.as_ref(), 3)
            .await
            .unwrap();
        let Some(last) = batch.last() else {
            break;
        };
        cursor = last.published_cursor();
        resumed.extend(batch.into_iter().map(|post| post.id));
    }
    let expected: Vec<_> = everything.into_iter().map(|post| post.id).collect();
    assert_eq!(resumed, expected);
}
