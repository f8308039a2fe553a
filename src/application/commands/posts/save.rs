// src/application/commands/posts/save.rs
use super::PostCommandService;
use crate::{
    application::{
        dto::AutosaveReceipt,
        error::{ApplicationError, ApplicationResult},
    },
    domain::post::{BlogKey, BlogPost, PostId, PostStatus, Slug, Tags},
};
use chrono::{DateTime, Utc};

/// Editor form state. Blank `id` creates a new post; blank `blog_key` and
/// `slug` are defaulted from configuration and the title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavePostCommand {
    pub id: Option<String>,
    pub blog_key: Option<String>,
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub summary: Option<String>,
    pub hero_image_url: Option<String>,
    pub tags: Vec<String>,
    pub status: PostStatus,
    /// Shown by the editor only; the store stamps creation time on insert.
    pub created_utc: Option<DateTime<Utc>>,
    pub published_utc: Option<DateTime<Utc>>,
    pub author_id: Option<String>,
    pub author_name: Option<String>,
}

impl SavePostCommand {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_blog_key(mut self, blog_key: impl Into<String>) -> Self {
        self.blog_key = Some(blog_key.into());
        self
    }

    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Accepts the editor's comma separated tag field.
    #[must_use]
    pub fn with_tags_csv(mut self, raw: &str) -> Self {
        self.tags = Tags::parse_delimited(raw).into();
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl From<BlogPost> for SavePostCommand {
    fn from(post: BlogPost) -> Self {
        Self {
            id: Some(post.id.into()),
            blog_key: Some(post.blog_key.to_string()),
            title: post.title,
            slug: Some(post.slug.into()),
            content: post.content,
            summary: post.summary,
            hero_image_url: post.hero_image_url,
            tags: post.tags.into(),
            status: post.status,
            created_utc: Some(post.created_utc),
            published_utc: post.published_utc,
            author_id: post.author_id,
            author_name: post.author_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveMode {
    Explicit { publish: bool },
    /// Background save: status and publish time always come from storage.
    Autosave,
}

impl PostCommandService {
    /// Blank editor state for a new post in the tenant's default blog.
    pub fn new_draft(&self, caller_display_name: Option<&str>) -> SavePostCommand {
        let author_name = self
            .options
            .default_author_name
            .clone()
            .or_else(|| non_blank(caller_display_name.map(str::to_string)));

        SavePostCommand {
            blog_key: Some(self.options.blog_key.clone()),
            status: PostStatus::Draft,
            created_utc: Some(self.clock.now()),
            author_name,
            ..SavePostCommand::default()
        }
    }

    /// Create or update a post, optionally publishing it.
    ///
    /// Publishing sets `status = Published` and stamps `published_utc` only if
    /// neither the command nor the stored post already carries one.
    /// `author_id` is first-write-wins. Slug collisions surface as
    /// `ErrorKind::ConstraintConflict`.
    pub async fn create_or_update(
        &self,
        command: SavePostCommand,
        publish: bool,
        author_id: Option<&str>,
    ) -> ApplicationResult<BlogPost> {
        self.save(command, SaveMode::Explicit { publish }, author_id)
            .await
    }

    /// Periodic editor save. Never changes `status` or `published_utc`.
    pub async fn autosave(
        &self,
        command: SavePostCommand,
        author_id: Option<&str>,
    ) -> ApplicationResult<AutosaveReceipt> {
        let saved = self.save(command, SaveMode::Autosave, author_id).await?;
        Ok(AutosaveReceipt::from(&saved))
    }

    async fn save(
        &self,
        command: SavePostCommand,
        mode: SaveMode,
        author_id: Option<&str>,
    ) -> ApplicationResult<BlogPost> {
        let now = self.clock.now();
        let blog_key = BlogKey::or_default(command.blog_key.as_deref(), &self.options.blog_key);

        let (id, existing) = match non_blank(command.id.clone()) {
            Some(raw) => {
                let id = PostId::new(raw)?;
                let existing = self.read_repo.find_by_id(&blog_key, &id).await?;
                (id, existing)
            }
            None => (PostId::generate(), None),
        };

        let slug = self.resolve_slug(command.slug.as_deref(), &command.title)?;
        // New rows are stamped by the store clock, whatever the editor sent.
        let created_utc = existing.as_ref().map_or(now, |post| post.created_utc);

        let (status, published_utc) = match (mode, existing.as_ref()) {
            (SaveMode::Autosave, Some(stored)) => (stored.status, stored.published_utc),
            (SaveMode::Autosave, None) => (PostStatus::Draft, None),
            (SaveMode::Explicit { .. }, _) => (command.status, command.published_utc),
        };

        let mut post = BlogPost {
            id,
            blog_key,
            title: command.title,
            slug,
            content: command.content,
            summary: non_blank(command.summary),
            hero_image_url: non_blank(command.hero_image_url),
            tags: Tags::new(&command.tags),
            status,
            created_utc,
            updated_utc: Some(now),
            published_utc,
            deleted_utc: existing.as_ref().and_then(|p| p.deleted_utc),
            deleted_by: existing.as_ref().and_then(|p| p.deleted_by.clone()),
            author_id: existing
                .as_ref()
                .and_then(|p| non_blank(p.author_id.clone()))
                .or_else(|| non_blank(command.author_id))
                .or_else(|| non_blank(author_id.map(str::to_string))),
            author_name: non_blank(command.author_name)
                .or_else(|| existing.as_ref().and_then(|p| p.author_name.clone())),
        };

        if matches!(mode, SaveMode::Explicit { publish: true }) {
            if let Some(requested) = post.published_utc {
                if requested < post.created_utc {
                    return Err(ApplicationError::validation(
                        "publish date cannot be earlier than the created date",
                    ));
                }
            }
            if post.published_utc.is_none() {
                post.published_utc = existing.as_ref().and_then(|p| p.published_utc);
            }
            let first_publish = post.published_utc.is_none();
            post.publish(now);
            if first_publish {
                tracing::info!(
                    blog_key = %post.blog_key,
                    post_id = %post.id,
                    slug = %post.slug,
                    "publishing post"
                );
            }
        }

        let saved = self.write_repo.upsert(post).await?;

        tracing::debug!(
            blog_key = %saved.blog_key,
            post_id = %saved.id,
            status = %saved.status,
            autosave = matches!(mode, SaveMode::Autosave),
            "post saved"
        );
        Ok(saved)
    }

    /// A blank slug is derived from the title. A supplied slug must already be
    /// in normalized form; it is never rewritten.
    fn resolve_slug(&self, requested: Option<&str>, title: &str) -> ApplicationResult<Slug> {
        if let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) {
            if self.slugger.slugify(requested) != requested {
                return Err(ApplicationError::validation(format!(
                    "slug {requested:?} may only contain lowercase letters, digits and single hyphens"
                )));
            }
            return Ok(Slug::new(requested)?);
        }

        let generated = self.slugger.slugify(title);
        if generated.is_empty() {
            return Err(ApplicationError::validation(
                "a slug could not be derived; use letters or digits in the title",
            ));
        }
        Ok(Slug::new(generated)?)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
