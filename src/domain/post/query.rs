use crate::domain::post::value_objects::{BlogKey, DEFAULT_BLOG_KEY, PostStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Which posts, in what order, how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogQuery {
    pub blog_key: String,
    /// 1-based page index.
    pub page: u32,
    pub page_size: u32,
    pub tag: Option<String>,
    /// Case-insensitive substring matched against title and content.
    pub search_term: Option<String>,
    /// Include drafts, archived and soft-deleted posts (admin views).
    pub include_unpublished: bool,
    /// Ceiling for `published_utc`; defaults to the store's current time.
    pub published_before_utc: Option<DateTime<Utc>>,
    pub status: Option<PostStatus>,
}

impl Default for BlogQuery {
    fn default() -> Self {
        Self {
            blog_key: DEFAULT_BLOG_KEY.into(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            tag: None,
            search_term: None,
            include_unpublished: false,
            published_before_utc: None,
            status: None,
        }
    }
}

impl BlogQuery {
    pub fn for_blog(blog_key: impl Into<String>) -> Self {
        Self {
            blog_key: blog_key.into(),
            ..Self::default()
        }
    }

    /// Clamp and default every field. Idempotent.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.page < 1 {
            self.page = 1;
        }
        if self.page_size < 1 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.page_size > MAX_PAGE_SIZE {
            self.page_size = MAX_PAGE_SIZE;
        }
        let key = self.blog_key.trim();
        self.blog_key = if key.is_empty() {
            DEFAULT_BLOG_KEY.to_string()
        } else {
            key.to_string()
        };
        self.tag = non_blank(self.tag);
        self.search_term = non_blank(self.search_term);
        self
    }

    pub fn blog_key(&self) -> BlogKey {
        BlogKey::or_default(Some(&self.blog_key), DEFAULT_BLOG_KEY)
    }

    /// Number of rows skipped before the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.page_size)
    }

    /// Upper bound applied to `published_utc` for public reads.
    pub fn effective_now(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.published_before_utc.unwrap_or(now)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// One page of a filtered result set. `total_count` covers the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total_count: u64) -> Self {
        Self {
            items,
            page,
            page_size,
            total_count,
        }
    }

    pub fn empty(page: u32, page_size: u32) -> Self {
        Self::new(Vec::new(), page, page_size, 0)
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(u64::from(self.page_size))
    }

    pub fn has_next_page(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
        }
    }
}
