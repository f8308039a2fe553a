use crate::domain::post::{BlogPost, PostStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing projection of a post: everything except the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummaryDto {
    pub id: String,
    pub blog_key: String,
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub created_utc: DateTime<Utc>,
    #[serde(default)]
    pub updated_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_utc: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_utc: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
}

impl From<BlogPost> for PostSummaryDto {
    fn from(post: BlogPost) -> Self {
        Self {
            id: post.id.into(),
            blog_key: post.blog_key.to_string(),
            title: post.title,
            slug: post.slug.into(),
            summary: post.summary,
            hero_image_url: post.hero_image_url,
            tags: post.tags.into(),
            status: post.status,
            created_utc: post.created_utc,
            updated_utc: post.updated_utc,
            published_utc: post.published_utc,
            deleted_utc: post.deleted_utc,
            author_name: post.author_name,
        }
    }
}

/// What the editor needs back from a background save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutosaveReceipt {
    pub id: String,
    pub updated_utc: Option<DateTime<Utc>>,
}

impl From<&BlogPost> for AutosaveReceipt {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id.to_string(),
            updated_utc: post.updated_utc,
        }
    }
}
