// src/domain/post/entity.rs
use crate::domain::post::cursor::PublishedCursor;
use crate::domain::post::value_objects::{BlogKey, PostId, PostStatus, Slug, Tags};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored blog post. Serialized as-is by the document adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: PostId,
    pub blog_key: BlogKey,
    pub title: String,
    pub slug: Slug,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub hero_image_url: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    pub status: PostStatus,
    pub created_utc: DateTime<Utc>,
    #[serde(default)]
    pub updated_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_by: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
}

impl BlogPost {
    /// Move to `Published`. The publish timestamp is only set the first time.
    pub fn publish(&mut self, now: DateTime<Utc>) {
        self.status = PostStatus::Published;
        if self.published_utc.is_none() {
            self.published_utc = Some(now);
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_utc.is_some()
    }

    /// Published, not soft-deleted, and with a publish time at or before `as_of`.
    pub fn is_public_at(&self, as_of: DateTime<Utc>) -> bool {
        self.status == PostStatus::Published
            && !self.is_deleted()
            && self.published_utc.is_some_and(|at| at <= as_of)
    }

    pub fn mark_deleted(&mut self, now: DateTime<Utc>, deleted_by: impl Into<String>) {
        self.deleted_utc = Some(now);
        self.deleted_by = Some(deleted_by.into());
    }

    /// Position of this post in the forward publish-time scan.
    pub fn published_cursor(&self) -> Option<PublishedCursor> {
        self.published_utc
            .map(|at| PublishedCursor::new(at, self.id.clone()))
    }

    /// Copy every caller-editable field from `incoming`, leaving identity and
    /// `created_utc` untouched.
    pub fn apply_update(&mut self, incoming: Self, now: DateTime<Utc>) {
        self.author_id = incoming.author_id;
        self.author_name = incoming.author_name;
        self.updated_utc = Some(now);
        self.published_utc = incoming.published_utc;
        self.status = incoming.status;
        self.title = incoming.title;
        self.slug = incoming.slug;
        self.content = incoming.content;
        self.summary = incoming.summary;
        self.hero_image_url = incoming.hero_image_url;
        self.tags = incoming.tags;
    }

    /// Shape of a freshly inserted row: the caller's id and content with the
    /// store's clock for `created_utc`/`updated_utc` and no deletion marker.
    pub fn into_inserted(mut self, now: DateTime<Utc>) -> Self {
        self.created_utc = now;
        self.updated_utc = Some(now);
        self.deleted_utc = None;
        self.deleted_by = None;
        self
    }
}
