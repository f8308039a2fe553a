// src/infrastructure/repositories/redis_post.rs
//! Document-store adapter. Each post is one JSON document; slug ownership,
//! per-blog membership and the publish-time index are kept in side keys that
//! are only ever written together by a Lua script.
use super::{map_json, map_redis, map_redis_pool};
use crate::application::ports::time::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::post::specifications::PostQuerySpec;
use crate::domain::post::{
    BlogKey, BlogPost, BlogPostReadRepository, BlogPostWriteRepository, BlogQuery, PagedResult,
    PostId, PostStatus, PublishedCursor, Slug,
};
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use deadpool_redis::{Config as DeadpoolConfig, Connection, Pool, Runtime};
use std::sync::Arc;

/// KEYS: doc, new slug, previous slug, id set, publish index, id owner.
/// ARGV: id, document, publish score (empty to unindex), blog key.
/// Returns -1 when the id belongs to another blog, 0 on a slug collision.
const UPSERT_SCRIPT: &str = r"
    local owner = redis.call('GET', KEYS[6])
    if owner and owner ~= ARGV[4] then
        return -1
    end
    local holder = redis.call('GET', KEYS[2])
    if holder and holder ~= ARGV[1] then
        return 0
    end
    if KEYS[3] ~= KEYS[2] and redis.call('GET', KEYS[3]) == ARGV[1] then
        redis.call('DEL', KEYS[3])
    end
    redis.call('SET', KEYS[2], ARGV[1])
    redis.call('SET', KEYS[1], ARGV[2])
    redis.call('SET', KEYS[6], ARGV[4])
    redis.call('SADD', KEYS[4], ARGV[1])
    if ARGV[3] == '' then
        redis.call('ZREM', KEYS[5], ARGV[1])
    else
        redis.call('ZADD', KEYS[5], ARGV[3], ARGV[1])
    end
    return 1
";

/// KEYS: doc, slug, id owner, id set, publish index.
/// ARGV: document as read, id, replacement document (empty to remove).
/// Returns -1 when the document changed after it was read.
const DELETE_SCRIPT: &str = r"
    if redis.call('GET', KEYS[1]) ~= ARGV[1] then
        return -1
    end
    if ARGV[3] == '' then
        redis.call('DEL', KEYS[1])
        if redis.call('GET', KEYS[2]) == ARGV[2] then
            redis.call('DEL', KEYS[2])
        end
        redis.call('DEL', KEYS[3])
        redis.call('SREM', KEYS[4], ARGV[2])
    else
        redis.call('SET', KEYS[1], ARGV[3])
    end
    redis.call('ZREM', KEYS[5], ARGV[2])
    return 1
";

const DELETE_ATTEMPTS: usize = 3;

const SCAN_CHUNK: u32 = 100;

#[derive(Clone)]
pub struct RedisBlogPostRepository {
    pool: Pool,
    clock: Arc<dyn Clock>,
}

impl RedisBlogPostRepository {
    /// Create a repository from a redis URL (e.g. redis://:password@host:6379/0).
    pub fn from_url(url: &str, clock: Arc<dyn Clock>) -> DomainResult<Self> {
        let cfg = DeadpoolConfig::from_url(url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|err| DomainError::Persistence(err.to_string()))?;

        Ok(Self { pool, clock })
    }

    async fn conn(&self) -> DomainResult<Connection> {
        self.pool.get().await.map_err(map_redis_pool)
    }

    async fn load_raw(&self, conn: &mut Connection, blog_key: &BlogKey, id: &str) -> DomainResult<Option<String>> {
        redis::cmd("GET")
            .arg(doc_key(blog_key, id))
            .query_async(conn)
            .await
            .map_err(map_redis)
    }

    async fn load(&self, conn: &mut Connection, blog_key: &BlogKey, id: &str) -> DomainResult<Option<BlogPost>> {
        self.load_raw(conn, blog_key, id)
            .await?
            .map(|doc| serde_json::from_str(&doc).map_err(map_json))
            .transpose()
    }

    async fn load_many(
        &self,
        conn: &mut Connection,
        blog_key: &BlogKey,
        ids: &[String],
    ) -> DomainResult<Vec<BlogPost>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<String> = ids.iter().map(|id| doc_key(blog_key, id)).collect();
        let docs: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(conn)
            .await
            .map_err(map_redis)?;

        docs.into_iter()
            .flatten()
            .map(|doc| serde_json::from_str(&doc).map_err(map_json))
            .collect()
    }
}

fn doc_key(blog_key: &BlogKey, id: &str) -> String {
    format!("blog:{blog_key}:post:{id}")
}

fn slug_key(blog_key: &BlogKey, slug: &Slug) -> String {
    format!("blog:{blog_key}:slug:{slug}")
}

fn ids_key(blog_key: &BlogKey) -> String {
    format!("blog:{blog_key}:posts")
}

fn published_key(blog_key: &BlogKey) -> String {
    format!("blog:{blog_key}:published")
}

fn owner_key(id: &PostId) -> String {
    format!("blog:post-owner:{id}")
}

fn score(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

/// Documents carry microsecond precision so that the index score and the
/// stored timestamp order identically.
fn truncate_timestamps(mut post: BlogPost) -> BlogPost {
    post.created_utc = post.created_utc.trunc_subsecs(6);
    post.updated_utc = post.updated_utc.map(|at| at.trunc_subsecs(6));
    post.published_utc = post.published_utc.map(|at| at.trunc_subsecs(6));
    post.deleted_utc = post.deleted_utc.map(|at| at.trunc_subsecs(6));
    post
}

#[derive(Debug, PartialEq, Eq)]
enum DeletePlan {
    /// Drafts leave no trace.
    Remove { slug: Slug },
    /// Published and archived posts keep their document with a delete marker.
    Replace { slug: Slug, doc: String },
    AlreadyDeleted,
}

fn plan_delete(raw: &str, now: DateTime<Utc>, acting_user: &str) -> DomainResult<DeletePlan> {
    let mut post: BlogPost = serde_json::from_str(raw).map_err(map_json)?;
    if post.status == PostStatus::Draft {
        return Ok(DeletePlan::Remove { slug: post.slug });
    }
    if post.is_deleted() {
        return Ok(DeletePlan::AlreadyDeleted);
    }
    post.mark_deleted(now, acting_user);
    let slug = post.slug.clone();
    let doc = serde_json::to_string(&truncate_timestamps(post)).map_err(map_json)?;
    Ok(DeletePlan::Replace { slug, doc })
}

fn index_score(post: &BlogPost) -> String {
    match post.published_utc {
        Some(at) if post.status == PostStatus::Published && !post.is_deleted() => {
            score(at).to_string()
        }
        _ => String::new(),
    }
}

#[async_trait]
impl BlogPostWriteRepository for RedisBlogPostRepository {
    async fn upsert(&self, post: BlogPost) -> DomainResult<BlogPost> {
        let now = self.clock.now();
        let mut conn = self.conn().await?;

        let existing = self
            .load(&mut conn, &post.blog_key, post.id.as_str())
            .await?;
        let previous_slug = existing.as_ref().map(|stored| stored.slug.clone());
        let saved = match existing {
            Some(mut stored) => {
                stored.apply_update(post, now);
                stored
            }
            None => post.into_inserted(now),
        };
        let saved = truncate_timestamps(saved);

        let doc = serde_json::to_string(&saved).map_err(map_json)?;
        let new_slug_key = slug_key(&saved.blog_key, &saved.slug);
        let old_slug_key = previous_slug
            .map(|slug| slug_key(&saved.blog_key, &slug))
            .unwrap_or_else(|| new_slug_key.clone());

        let outcome: i32 = redis::cmd("EVAL")
            .arg(UPSERT_SCRIPT)
            .arg(6)
            .arg(doc_key(&saved.blog_key, saved.id.as_str()))
            .arg(&new_slug_key)
            .arg(&old_slug_key)
            .arg(ids_key(&saved.blog_key))
            .arg(published_key(&saved.blog_key))
            .arg(owner_key(&saved.id))
            .arg(saved.id.as_str())
            .arg(doc)
            .arg(index_score(&saved))
            .arg(saved.blog_key.as_str())
            .query_async(&mut conn)
            .await
            .map_err(map_redis)?;

        match outcome {
            1 => Ok(saved),
            0 => Err(DomainError::Conflict("slug already exists in this blog".into())),
            _ => Err(DomainError::Conflict(format!(
                "post {} belongs to a different blog",
                saved.id
            ))),
        }
    }

    async fn delete(&self, blog_key: &BlogKey, id: &PostId, acting_user: &str) -> DomainResult<()> {
        let mut conn = self.conn().await?;

        // The status decision and the write must see the same document, so the
        // script only applies the plan if the stored document is unchanged.
        for _ in 0..DELETE_ATTEMPTS {
            let Some(raw) = self.load_raw(&mut conn, blog_key, id.as_str()).await? else {
                return Ok(());
            };
            let (slug, replacement) = match plan_delete(&raw, self.clock.now(), acting_user)? {
                DeletePlan::AlreadyDeleted => return Ok(()),
                DeletePlan::Remove { slug } => (slug, String::new()),
                DeletePlan::Replace { slug, doc } => (slug, doc),
            };

            let outcome: i32 = redis::cmd("EVAL")
                .arg(DELETE_SCRIPT)
                .arg(5)
                .arg(doc_key(blog_key, id.as_str()))
                .arg(slug_key(blog_key, &slug))
                .arg(owner_key(id))
                .arg(ids_key(blog_key))
                .arg(published_key(blog_key))
                .arg(&raw)
                .arg(id.as_str())
                .arg(replacement)
                .query_async(&mut conn)
                .await
                .map_err(map_redis)?;
            if outcome == 1 {
                return Ok(());
            }
            tracing::debug!(post_id = %id, "post changed during delete; retrying");
        }

        Err(DomainError::Conflict(format!(
            "post {id} kept changing during delete; retry"
        )))
    }
}

#[async_trait]
impl BlogPostReadRepository for RedisBlogPostRepository {
    async fn find_by_id(&self, blog_key: &BlogKey, id: &PostId) -> DomainResult<Option<BlogPost>> {
        let mut conn = self.conn().await?;
        self.load(&mut conn, blog_key, id.as_str()).await
    }

    async fn find_by_slug(
        &self,
        blog_key: &BlogKey,
        slug: &Slug,
        include_unpublished: bool,
    ) -> DomainResult<Option<BlogPost>> {
        let mut conn = self.conn().await?;
        let owner: Option<String> = redis::cmd("GET")
            .arg(slug_key(blog_key, slug))
            .query_async(&mut conn)
            .await
            .map_err(map_redis)?;
        let Some(id) = owner else {
            return Ok(None);
        };

        let now = self.clock.now();
        Ok(self
            .load(&mut conn, blog_key, &id)
            .await?
            .filter(|post| include_unpublished || post.is_public_at(now)))
    }

    async fn query(&self, query: &BlogQuery) -> DomainResult<PagedResult<BlogPost>> {
        let blog_key = query.blog_key();
        let mut conn = self.conn().await?;
        let ids: Vec<String> = redis::cmd("SMEMBERS")
            .arg(ids_key(&blog_key))
            .query_async(&mut conn)
            .await
            .map_err(map_redis)?;

        let posts = self.load_many(&mut conn, &blog_key, &ids).await?;
        Ok(PostQuerySpec::new(query, self.clock.now()).apply(posts))
    }

    async fn scan_published_after(
        &self,
        blog_key: &BlogKey,
        as_of: DateTime<Utc>,
        cursor: Option<&PublishedCursor>,
        limit: u32,
    ) -> DomainResult<Vec<BlogPost>> {
        let limit = limit.max(1) as usize;
        let min = cursor.map_or_else(|| "-inf".to_string(), |c| score(c.published_utc).to_string());
        let max = score(as_of).to_string();
        let mut conn = self.conn().await?;

        let mut selected = Vec::with_capacity(limit);
        let mut offset: u32 = 0;
        loop {
            // Members with equal scores come back in byte order of the id.
            let ids: Vec<String> = redis::cmd("ZRANGEBYSCORE")
                .arg(published_key(blog_key))
                .arg(&min)
                .arg(&max)
                .arg("LIMIT")
                .arg(offset)
                .arg(SCAN_CHUNK)
                .query_async(&mut conn)
                .await
                .map_err(map_redis)?;
            let exhausted = ids.len() < SCAN_CHUNK as usize;
            offset += SCAN_CHUNK;

            let posts = self.load_many(&mut conn, blog_key, &ids).await?;
            for post in posts {
                let Some(position) = post.published_cursor() else {
                    continue;
                };
                let after_cursor =
                    cursor.is_none_or(|c| c.precedes(position.published_utc, &position.id));
                if after_cursor && post.is_public_at(as_of) {
                    selected.push(post);
                    if selected.len() == limit {
                        return Ok(selected);
                    }
                }
            }

            if exhausted {
                return Ok(selected);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::Tags;
    use chrono::TimeZone;

    fn post(status: PostStatus) -> BlogPost {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        BlogPost {
            id: PostId::new("abc").unwrap(),
            blog_key: BlogKey::default(),
            title: "Hello".into(),
            slug: Slug::new("hello").unwrap(),
            content: String::new(),
            summary: None,
            hero_image_url: None,
            tags: Tags::default(),
            status,
            created_utc: at,
            updated_utc: None,
            published_utc: Some(at),
            deleted_utc: None,
            deleted_by: None,
            author_id: None,
            author_name: None,
        }
    }

    #[test]
    fn keys_are_partitioned_by_blog() {
        let key = BlogKey::new("docs").unwrap();
        assert_eq!(doc_key(&key, "abc"), "blog:docs:post:abc");
        assert_eq!(
            slug_key(&key, &Slug::new("hello").unwrap()),
            "blog:docs:slug:hello"
        );
        assert_eq!(published_key(&key), "blog:docs:published");
    }

    #[test]
    fn only_live_published_posts_are_indexed() {
        assert_eq!(index_score(&post(PostStatus::Published)), "1709294400000000");
        assert_eq!(index_score(&post(PostStatus::Archived)), "");

        let mut deleted = post(PostStatus::Published);
        deleted.mark_deleted(Utc::now(), "admin");
        assert_eq!(index_score(&deleted), "");
    }

    #[test]
    fn timestamps_are_stored_at_microsecond_precision() {
        let mut sample = post(PostStatus::Published);
        sample.published_utc = sample
            .published_utc
            .map(|at| at + chrono::Duration::nanoseconds(1_234_567));
        let stored = truncate_timestamps(sample);
        assert_eq!(
            stored.published_utc.map(|at| at.timestamp_subsec_nanos()),
            Some(1_234_000)
        );
    }

    #[test]
    fn deleting_a_draft_removes_it() {
        let raw = serde_json::to_string(&post(PostStatus::Draft)).unwrap();
        let plan = plan_delete(&raw, Utc::now(), "admin").unwrap();
        assert_eq!(
            plan,
            DeletePlan::Remove {
                slug: Slug::new("hello").unwrap()
            }
        );
    }

    #[test]
    fn deleting_a_published_post_keeps_a_marked_document() {
        let raw = serde_json::to_string(&post(PostStatus::Published)).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();

        let DeletePlan::Replace { slug, doc } = plan_delete(&raw, at, "admin").unwrap() else {
            panic!("published posts are soft deleted");
        };
        assert_eq!(slug.as_str(), "hello");
        let stored: BlogPost = serde_json::from_str(&doc).unwrap();
        assert_eq!(stored.deleted_utc, Some(at));
        assert_eq!(stored.deleted_by.as_deref(), Some("admin"));
        assert_eq!(index_score(&stored), "");

        assert_eq!(
            plan_delete(&doc, at + chrono::Duration::hours(1), "other").unwrap(),
            DeletePlan::AlreadyDeleted
        );
    }
}
