pub mod cursor;
pub mod entity;
pub mod query;
pub mod repository;
pub mod sitemap;
pub mod slug;
pub mod specifications;
pub mod value_objects;

pub use cursor::PublishedCursor;
pub use entity::BlogPost;
pub use query::{BlogQuery, PagedResult};
pub use repository::{BlogPostReadRepository, BlogPostWriteRepository};
pub use sitemap::PublicSitemapItem;
pub use slug::generate_slug;
pub use value_objects::{BlogKey, PostId, PostStatus, Slug, Tags, DEFAULT_BLOG_KEY};
