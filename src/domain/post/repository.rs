use crate::domain::errors::DomainResult;
use crate::domain::post::cursor::PublishedCursor;
use crate::domain::post::entity::BlogPost;
use crate::domain::post::query::{BlogQuery, PagedResult};
use crate::domain::post::value_objects::{BlogKey, PostId, Slug};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage boundary for writes. Implementations rely on the engine's own
/// constraints for slug uniqueness and on single-operation atomicity.
#[async_trait]
pub trait BlogPostWriteRepository: Send + Sync {
    /// Insert a new record (keeping the caller's id, stamping `created_utc`
    /// from the store clock) or overwrite the editable fields of an existing
    /// `(blog_key, id)` row. A `(blog_key, slug)` collision is
    /// `DomainError::Conflict`.
    async fn upsert(&self, post: BlogPost) -> DomainResult<BlogPost>;

    /// Hard-delete drafts, soft-delete everything else. Missing rows are a no-op.
    async fn delete(&self, blog_key: &BlogKey, id: &PostId, acting_user: &str) -> DomainResult<()>;
}

#[async_trait]
pub trait BlogPostReadRepository: Send + Sync {
    async fn find_by_id(&self, blog_key: &BlogKey, id: &PostId) -> DomainResult<Option<BlogPost>>;

    /// With `include_unpublished == false` only publicly visible posts match.
    async fn find_by_slug(
        &self,
        blog_key: &BlogKey,
        slug: &Slug,
        include_unpublished: bool,
    ) -> DomainResult<Option<BlogPost>>;

    /// `query` is normalized by the caller.
    async fn query(&self, query: &BlogQuery) -> DomainResult<PagedResult<BlogPost>>;

    /// Publicly visible posts with `published_utc <= as_of`, strictly after
    /// `cursor`, ordered by `(published_utc, id)` ascending.
    async fn scan_published_after(
        &self,
        blog_key: &BlogKey,
        as_of: DateTime<Utc>,
        cursor: Option<&PublishedCursor>,
        limit: u32,
    ) -> DomainResult<Vec<BlogPost>>;
}
