// src/application/ports/util.rs

/// Turns free text (usually a post title) into a URL path segment.
pub trait SlugGenerator: Send + Sync {
    fn slugify(&self, input: &str) -> String;
}
