// tests/support/mocks/repos.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quill_core::domain::errors::{DomainError, DomainResult};
use quill_core::domain::post::{
    BlogKey, BlogPost, BlogPostReadRepository, BlogPostWriteRepository, BlogQuery, PagedResult,
    PostId, PublishedCursor, Slug,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Every call fails as if the store were unreachable.
pub struct UnavailableRepo;

fn unavailable<T>() -> DomainResult<T> {
    Err(DomainError::Unavailable("connection refused".into()))
}

#[async_trait]
impl BlogPostReadRepository for UnavailableRepo {
    async fn find_by_id(&self, _: &BlogKey, _: &PostId) -> DomainResult<Option<BlogPost>> {
        unavailable()
    }

    async fn find_by_slug(&self, _: &BlogKey, _: &Slug, _: bool) -> DomainResult<Option<BlogPost>> {
        unavailable()
    }

    async fn query(&self, _: &BlogQuery) -> DomainResult<PagedResult<BlogPost>> {
        unavailable()
    }

    async fn scan_published_after(
        &self,
        _: &BlogKey,
        _: DateTime<Utc>,
        _: Option<&PublishedCursor>,
        _: u32,
    ) -> DomainResult<Vec<BlogPost>> {
        unavailable()
    }
}

#[async_trait]
impl BlogPostWriteRepository for UnavailableRepo {
    async fn upsert(&self, _: BlogPost) -> DomainResult<BlogPost> {
        unavailable()
    }

    async fn delete(&self, _: &BlogKey, _: &PostId, _: &str) -> DomainResult<()> {
        unavailable()
    }
}

/// Scan that ignores the cursor and always returns the same batch.
pub struct StuckScanRepo {
    pub batch: Vec<BlogPost>,
    pub scans: AtomicUsize,
}

impl StuckScanRepo {
    pub fn new(batch: Vec<BlogPost>) -> Self {
        Self {
            batch,
            scans: AtomicUsize::new(0),
        }
    }

    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlogPostReadRepository for StuckScanRepo {
    async fn find_by_id(&self, _: &BlogKey, _: &PostId) -> DomainResult<Option<BlogPost>> {
        Ok(None)
    }

    async fn find_by_slug(&self, _: &BlogKey, _: &Slug, _: bool) -> DomainResult<Option<BlogPost>> {
        Ok(None)
    }

    async fn query(&self, query: &BlogQuery) -> DomainResult<PagedResult<BlogPost>> {
        Ok(PagedResult::empty(query.page, query.page_size))
    }

    async fn scan_published_after(
        &self,
        _: &BlogKey,
        _: DateTime<Utc>,
        _: Option<&PublishedCursor>,
        _: u32,
    ) -> DomainResult<Vec<BlogPost>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(self.batch.clone())
    }
}
