//! In-process evaluation of the post filters, shared by the adapters that
//! cannot push predicates down to the storage engine.
use crate::domain::post::cursor::PublishedCursor;
use crate::domain::post::entity::BlogPost;
use crate::domain::post::query::{BlogQuery, PagedResult};
use chrono::{DateTime, Utc};

pub struct PostQuerySpec<'a> {
    query: &'a BlogQuery,
    as_of: DateTime<Utc>,
    search: Option<String>,
}

impl<'a> PostQuerySpec<'a> {
    /// `query` must already be normalized; `now` is the store's clock.
    pub fn new(query: &'a BlogQuery, now: DateTime<Utc>) -> Self {
        Self {
            query,
            as_of: query.effective_now(now),
            search: query.search_term.as_deref().map(str::to_lowercase),
        }
    }

    pub fn is_satisfied_by(&self, post: &BlogPost) -> bool {
        if post.blog_key.as_str() != self.query.blog_key {
            return false;
        }
        if !self.query.include_unpublished && !post.is_public_at(self.as_of) {
            return false;
        }
        if self.query.status.is_some_and(|status| post.status != status) {
            return false;
        }
        if let Some(tag) = self.query.tag.as_deref() {
            if !post.tags.contains(tag) {
                return false;
            }
        }
        if let Some(term) = self.search.as_deref() {
            if !post.title.to_lowercase().contains(term)
                && !post.content.to_lowercase().contains(term)
            {
                return false;
            }
        }
        true
    }

    /// Filter, order, count, then window.
    pub fn apply(&self, posts: impl IntoIterator<Item = BlogPost>) -> PagedResult<BlogPost> {
        let mut matched: Vec<BlogPost> = posts
            .into_iter()
            .filter(|post| self.is_satisfied_by(post))
            .collect();

        if self.query.include_unpublished {
            matched.sort_by(|a, b| (b.created_utc, &b.id).cmp(&(a.created_utc, &a.id)));
        } else {
            matched.sort_by(|a, b| (b.published_utc, &b.id).cmp(&(a.published_utc, &a.id)));
        }

        let total_count = matched.len() as u64;
        let skip = usize::try_from(self.query.offset()).unwrap_or(usize::MAX);
        let take = self.query.page_size as usize;
        let items = matched.into_iter().skip(skip).take(take).collect();

        PagedResult::new(items, self.query.page, self.query.page_size, total_count)
    }
}

/// Published, live posts with `published_utc <= as_of`, strictly after
/// `cursor`, ordered by `(published_utc, id)` ascending, at most `limit`.
pub fn select_published_after(
    posts: impl IntoIterator<Item = BlogPost>,
    as_of: DateTime<Utc>,
    cursor: Option<&PublishedCursor>,
    limit: usize,
) -> Vec<BlogPost> {
    let mut selected: Vec<(PublishedCursor, BlogPost)> = posts
        .into_iter()
        .filter(|post| post.is_public_at(as_of))
        .filter_map(|post| post.published_cursor().map(|position| (position, post)))
        .filter(|(position, _)| {
            cursor.is_none_or(|after| after.precedes(position.published_utc, &position.id))
        })
        .collect();

    selected.sort_by(|(a, _), (b, _)| a.cmp(b));
    selected.truncate(limit);
    selected.into_iter().map(|(_, post)| post).collect()
}
