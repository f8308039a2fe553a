// src/infrastructure/repositories/memory_post.rs
use crate::application::ports::time::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::post::specifications::{PostQuerySpec, select_published_after};
use crate::domain::post::{
    BlogKey, BlogPost, BlogPostReadRepository, BlogPostWriteRepository, BlogQuery, PagedResult,
    PostId, PostStatus, PublishedCursor, Slug,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type PostKey = (BlogKey, PostId);

/// Process-local store with the same observable behavior as the durable
/// adapters. Backs the `memory` backend and the test suites.
#[derive(Clone)]
pub struct InMemoryBlogPostRepository {
    posts: Arc<Mutex<HashMap<PostKey, BlogPost>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryBlogPostRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            posts: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Number of stored rows, including soft-deleted ones.
    pub fn count(&self) -> DomainResult<usize> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> DomainResult<MutexGuard<'_, HashMap<PostKey, BlogPost>>> {
        self.posts
            .lock()
            .map_err(|_| DomainError::Persistence("in-memory store poisoned".into()))
    }

    fn snapshot(&self, blog_key: &BlogKey) -> DomainResult<Vec<BlogPost>> {
        Ok(self
            .lock()?
            .values()
            .filter(|post| &post.blog_key == blog_key)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BlogPostWriteRepository for InMemoryBlogPostRepository {
    async fn upsert(&self, post: BlogPost) -> DomainResult<BlogPost> {
        let now = self.clock.now();
        let mut posts = self.lock()?;

        let slug_taken = posts.values().any(|other| {
            other.blog_key == post.blog_key && other.slug == post.slug && other.id != post.id
        });
        if slug_taken {
            return Err(DomainError::Conflict("slug already exists in this blog".into()));
        }

        let foreign_id = posts
            .keys()
            .any(|(key, id)| id == &post.id && key != &post.blog_key);
        if foreign_id {
            return Err(DomainError::Conflict(format!(
                "post {} belongs to a different blog",
                post.id
            )));
        }

        let key = (post.blog_key.clone(), post.id.clone());
        let saved = match posts.get_mut(&key) {
            Some(existing) => {
                existing.apply_update(post, now);
                existing.clone()
            }
            None => {
                let inserted = post.into_inserted(now);
                posts.insert(key, inserted.clone());
                inserted
            }
        };
        Ok(saved)
    }

    async fn delete(&self, blog_key: &BlogKey, id: &PostId, acting_user: &str) -> DomainResult<()> {
        let now = self.clock.now();
        let mut posts = self.lock()?;
        let key = (blog_key.clone(), id.clone());

        match posts.get(&key).map(|post| post.status) {
            None => {}
            Some(PostStatus::Draft) => {
                posts.remove(&key);
            }
            Some(_) => {
                if let Some(post) = posts.get_mut(&key).filter(|post| !post.is_deleted()) {
                    post.mark_deleted(now, acting_user);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BlogPostReadRepository for InMemoryBlogPostRepository {
    async fn find_by_id(&self, blog_key: &BlogKey, id: &PostId) -> DomainResult<Option<BlogPost>> {
        Ok(self
            .lock()?
            .get(&(blog_key.clone(), id.clone()))
            .cloned())
    }

    async fn find_by_slug(
        &self,
        blog_key: &BlogKey,
        slug: &Slug,
        include_unpublished: bool,
    ) -> DomainResult<Option<BlogPost>> {
        let now = self.clock.now();
        Ok(self
            .lock()?
            .values()
            .find(|post| {
                &post.blog_key == blog_key
                    && &post.slug == slug
                    && (include_unpublished || post.is_public_at(now))
            })
            .cloned())
    }

    async fn query(&self, query: &BlogQuery) -> DomainResult<PagedResult<BlogPost>> {
        let candidates = self.snapshot(&query.blog_key())?;
        Ok(PostQuerySpec::new(query, self.clock.now()).apply(candidates))
    }

    async fn scan_published_after(
        &self,
        blog_key: &BlogKey,
        as_of: DateTime<Utc>,
        cursor: Option<&PublishedCursor>,
        limit: u32,
    ) -> DomainResult<Vec<BlogPost>> {
        let candidates = self.snapshot(blog_key)?;
        Ok(select_published_after(
            candidates,
            as_of,
            cursor,
            limit as usize,
        ))
    }
}
