// tests/support/builders.rs
use super::helpers::TestApp;
use chrono::{DateTime, Duration, Utc};
use quill_core::application::commands::posts::SavePostCommand;
use quill_core::domain::post::{BlogKey, BlogPost, PostId, PostStatus, Slug, Tags};

pub const EDITOR: &str = "editor-1";

pub fn draft(title: &str) -> SavePostCommand {
    SavePostCommand::new(title, format!("Body of {title}"))
}

/// Create and publish a post at the current clock time, then step the
/// clock forward one minute so the next post sorts after it.
pub async fn publish_at_tick(app: &TestApp, title: &str) -> BlogPost {
    let post = app
        .services
        .post_commands
        .create_or_update(draft(title), true, Some(EDITOR))
        .await
        .unwrap();
    app.clock.advance(Duration::minutes(1));
    post
}

pub struct BlogPostBuilder {
    id: String,
    blog_key: BlogKey,
    title: String,
    slug: String,
    content: String,
    tags: Tags,
    status: PostStatus,
    published_utc: Option<DateTime<Utc>>,
    created_utc: DateTime<Utc>,
}

impl BlogPostBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.into(),
            blog_key: BlogKey::default(),
            title: "Built post".into(),
            slug: format!("post-{id}"),
            content: "Built body".into(),
            tags: Tags::default(),
            status: PostStatus::Draft,
            published_utc: None,
            created_utc: super::mocks::fixed_now(),
        }
    }

    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.status = PostStatus::Published;
        self.published_utc = Some(at);
        self
    }

    pub fn in_blog(mut self, blog_key: &BlogKey) -> Self {
        self.blog_key = blog_key.clone();
        self
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.into();
        self
    }

    pub fn tagged(mut self, tags: &[&str]) -> Self {
        self.tags = Tags::new(tags.iter().copied());
        self
    }

    pub fn build(self) -> BlogPost {
        BlogPost {
            id: PostId::new(self.id).unwrap(),
            blog_key: self.blog_key,
            title: self.title,
            slug: Slug::new(self.slug).unwrap(),
            content: self.content,
            summary: None,
            hero_image_url: None,
            tags: self.tags,
            status: self.status,
            created_utc: self.created_utc,
            updated_utc: None,
            published_utc: self.published_utc,
            deleted_utc: None,
            deleted_by: None,
            author_id: None,
            author_name: None,
        }
    }
}
