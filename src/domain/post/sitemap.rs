use crate::domain::post::cursor::PublishedCursor;
use crate::domain::post::value_objects::Slug;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

pub const DEFAULT_ROUTE_PREFIX: &str = "/blog";

/// Public URL of a published post. Derived on the fly, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicSitemapItem {
    /// Relative URL, e.g. `/blog/2024/03/my-first-post`.
    pub url: String,
    pub last_modified: DateTime<Utc>,
    /// Scan position this item was produced at; pass it back to resume.
    #[serde(skip)]
    pub position: PublishedCursor,
}

/// Trim, force exactly one leading slash, drop trailing slashes. Blank
/// prefixes (including a bare `/`) become [`DEFAULT_ROUTE_PREFIX`].
pub fn normalize_route_prefix(prefix: &str) -> String {
    let inner = prefix.trim().trim_matches('/');
    if inner.is_empty() {
        DEFAULT_ROUTE_PREFIX.to_string()
    } else {
        format!("/{inner}")
    }
}

/// `{prefix}/{YYYY}/{MM}/{slug}` using the UTC calendar month of `published_utc`.
pub fn public_post_path(normalized_prefix: &str, published_utc: DateTime<Utc>, slug: &Slug) -> String {
    format!(
        "{normalized_prefix}/{:04}/{:02}/{slug}",
        published_utc.year(),
        published_utc.month()
    )
}
