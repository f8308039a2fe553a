use super::PostQueryService;
use crate::{
    application::{dto::PostSummaryDto, error::ApplicationResult},
    domain::post::{BlogKey, BlogQuery, PagedResult},
};

impl PostQueryService {
    /// Published, live posts newest-published first. Visibility is evaluated
    /// against `published_before_utc`, which defaults to now.
    pub async fn list_public(
        &self,
        query: BlogQuery,
    ) -> ApplicationResult<PagedResult<PostSummaryDto>> {
        let mut query = self.with_defaults(query, self.options.public_page_size);
        query.include_unpublished = false;
        query.published_before_utc = Some(
            query
                .published_before_utc
                .unwrap_or_else(|| self.clock.now()),
        );
        self.run(query.normalize()).await
    }

    /// Every post of the blog, including drafts and soft-deleted ones,
    /// newest-created first. `query.status` narrows to one status.
    pub async fn list_admin(
        &self,
        query: BlogQuery,
    ) -> ApplicationResult<PagedResult<PostSummaryDto>> {
        let mut query = self.with_defaults(query, self.options.admin_page_size);
        query.include_unpublished = true;
        self.run(query.normalize()).await
    }

    fn with_defaults(&self, mut query: BlogQuery, page_size: u32) -> BlogQuery {
        query.blog_key = BlogKey::or_default(Some(&query.blog_key), &self.options.blog_key).to_string();
        if query.page_size == 0 {
            query.page_size = page_size;
        }
        query
    }

    async fn run(&self, query: BlogQuery) -> ApplicationResult<PagedResult<PostSummaryDto>> {
        tracing::debug!(
            blog_key = %query.blog_key,
            page = query.page,
            page_size = query.page_size,
            include_unpublished = query.include_unpublished,
            "querying posts"
        );
        let result = self.read_repo.query(&query).await?;
        Ok(result.map(PostSummaryDto::from))
    }
}
