//! Lazy export of every public post URL of one blog.
//!
//! The exporter walks the store's forward scan in `(published_utc, id)` order,
//! one batch at a time, and stops at the first empty batch. The snapshot time
//! is captured when the stream is created, so a fixed set of published posts
//! always yields the same sequence.
//!
//! Posts published concurrently with a timestamp at or before the cursor that
//! has already been consumed are not seen by that run; they appear in the
//! next one.
use std::{collections::VecDeque, sync::Arc};

use chrono::{DateTime, Utc};
use futures::{Stream, TryStreamExt, stream};

use crate::{
    application::{error::ApplicationResult, ports::ClockPort},
    config::BlogOptions,
    domain::post::{
        BlogKey, BlogPost, BlogPostReadRepository, PublicSitemapItem, PublishedCursor,
        sitemap::{normalize_route_prefix, public_post_path},
    },
};

pub const SITEMAP_BATCH_SIZE: u32 = 250;

pub struct SitemapExporter {
    read_repo: Arc<dyn BlogPostReadRepository>,
    clock: Arc<ClockPort>,
    blog_key: BlogKey,
    route_prefix: String,
    batch_size: u32,
}

struct ScanState {
    as_of: DateTime<Utc>,
    cursor: Option<PublishedCursor>,
    pending: VecDeque<PublicSitemapItem>,
}

impl SitemapExporter {
    pub fn new(
        read_repo: Arc<dyn BlogPostReadRepository>,
        clock: Arc<ClockPort>,
        options: &BlogOptions,
    ) -> Self {
        Self {
            read_repo,
            clock,
            blog_key: BlogKey::or_default(Some(&options.blog_key), ""),
            route_prefix: normalize_route_prefix(&options.public_route_prefix),
            batch_size: SITEMAP_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Every public URL, oldest publication first.
    pub fn stream_public_urls(
        &self,
    ) -> impl Stream<Item = ApplicationResult<PublicSitemapItem>> + Send + '_ {
        self.stream_after(None)
    }

    /// Resume strictly after `cursor` (usually the `position` of the last
    /// item a previous run produced).
    pub fn stream_after(
        &self,
        cursor: Option<PublishedCursor>,
    ) -> impl Stream<Item = ApplicationResult<PublicSitemapItem>> + Send + '_ {
        let state = ScanState {
            as_of: self.clock.now(),
            cursor,
            pending: VecDeque::new(),
        };
        stream::try_unfold(state, move |state| self.next_item(state))
    }

    pub async fn collect_public_urls(&self) -> ApplicationResult<Vec<PublicSitemapItem>> {
        self.stream_public_urls().try_collect().await
    }

    async fn next_item(
        &self,
        mut state: ScanState,
    ) -> ApplicationResult<Option<(PublicSitemapItem, ScanState)>> {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Ok(Some((item, state)));
            }

            let batch = self
                .read_repo
                .scan_published_after(
                    &self.blog_key,
                    state.as_of,
                    state.cursor.as_ref(),
                    self.batch_size,
                )
                .await?;
            if batch.is_empty() {
                return Ok(None);
            }

            tracing::debug!(blog_key = %self.blog_key, batch = batch.len(), "sitemap batch");
            let mut cursor = state.cursor.clone();
            let mut items = Vec::with_capacity(batch.len());
            for post in batch {
                let Some(position) = post.published_cursor() else {
                    tracing::warn!(post_id = %post.id, "scan returned a post without a publish time");
                    continue;
                };
                if cursor.as_ref().is_some_and(|c| position <= *c) {
                    continue;
                }
                cursor = Some(position.clone());
                if let Some(item) = self.to_item(&post, position, state.as_of) {
                    items.push(item);
                }
            }

            // A store that does not move the cursor forward would loop forever.
            if cursor <= state.cursor {
                tracing::warn!(blog_key = %self.blog_key, "sitemap scan made no progress; stopping");
                return Ok(None);
            }
            state.cursor = cursor;
            state.pending.extend(items);
        }
    }

    fn to_item(
        &self,
        post: &BlogPost,
        position: PublishedCursor,
        as_of: DateTime<Utc>,
    ) -> Option<PublicSitemapItem> {
        if position.published_utc > as_of {
            tracing::warn!(post_id = %post.id, "scan returned a post published after the snapshot");
            return None;
        }
        let url = public_post_path(&self.route_prefix, position.published_utc, &post.slug);
        Some(PublicSitemapItem {
            url,
            last_modified: post.updated_utc.unwrap_or(position.published_utc),
            position,
        })
    }
}
