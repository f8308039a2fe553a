//! Title-to-slug normalization.

/// Turn arbitrary text into a URL-safe slug.
///
/// Lowercases, keeps only ASCII letters, digits, whitespace and hyphens,
/// turns every run of whitespace and hyphens into a single hyphen and trims
/// hyphens from both ends. Blank input yields an empty string.
pub fn generate_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
        // anything else is dropped without breaking the current word
    }

    slug
}
