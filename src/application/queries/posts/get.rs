use super::PostQueryService;
use crate::{
    application::error::{ApplicationError, ApplicationResult},
    domain::post::{
        BlogKey, BlogPost, PostId, Slug,
        sitemap::{normalize_route_prefix, public_post_path},
    },
};
use chrono::Datelike;

/// Outcome of resolving a public `/{year}/{month}/{slug}` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicPostResolution {
    Found(Box<BlogPost>),
    /// The slug exists but under a different year/month.
    Moved { canonical_path: String },
}

impl PostQueryService {
    /// Publicly visible post by slug.
    pub async fn get_public_by_slug(
        &self,
        blog_key: Option<&str>,
        slug: &str,
    ) -> ApplicationResult<BlogPost> {
        let blog_key = BlogKey::or_default(blog_key, &self.options.blog_key);
        let slug = Slug::new(slug).map_err(|_| ApplicationError::not_found("post not found"))?;
        self.read_repo
            .find_by_slug(&blog_key, &slug, false)
            .await?
            .ok_or_else(|| ApplicationError::not_found("post not found"))
    }

    /// Any post by id, including drafts and soft-deleted ones (editor view).
    pub async fn get_by_id(&self, blog_key: Option<&str>, id: &str) -> ApplicationResult<BlogPost> {
        let blog_key = BlogKey::or_default(blog_key, &self.options.blog_key);
        let id = PostId::new(id).map_err(|_| ApplicationError::not_found("post not found"))?;
        self.read_repo
            .find_by_id(&blog_key, &id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("post not found"))
    }

    /// Look up a public post in the default blog and check the date segment
    /// of the requested URL against its UTC publish month.
    pub async fn resolve_public_post(
        &self,
        year: i32,
        month: u32,
        slug: &str,
    ) -> ApplicationResult<PublicPostResolution> {
        let post = self.get_public_by_slug(None, slug).await?;
        let dated = post.published_utc.unwrap_or(post.created_utc);

        if dated.year() == year && dated.month() == month {
            return Ok(PublicPostResolution::Found(Box::new(post)));
        }

        let prefix = normalize_route_prefix(&self.options.public_route_prefix);
        let canonical_path = public_post_path(&prefix, dated, &post.slug);
        tracing::debug!(slug = %post.slug, %canonical_path, "redirecting to canonical post url");
        Ok(PublicPostResolution::Moved { canonical_path })
    }
}
