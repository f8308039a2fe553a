// src/infrastructure/repositories/postgres_post.rs
use super::map_sqlx;
use crate::application::ports::time::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::post::{
    BlogKey, BlogPost, BlogPostReadRepository, BlogPostWriteRepository, BlogQuery, PagedResult,
    PostId, PostStatus, PublishedCursor, Slug, Tags,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

const POST_COLUMNS: &str = "id, blog_key, title, slug, content, summary, hero_image_url, tags, status, \
     created_utc, updated_utc, published_utc, deleted_utc, deleted_by, author_id, author_name";

#[derive(Clone)]
pub struct PostgresBlogPostWriteRepository {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PostgresBlogPostWriteRepository {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[derive(Clone)]
pub struct PostgresBlogPostReadRepository {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PostgresBlogPostReadRepository {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[derive(Debug, FromRow)]
struct BlogPostRow {
    id: String,
    blog_key: String,
    title: String,
    slug: String,
    content: String,
    summary: Option<String>,
    hero_image_url: Option<String>,
    tags: String,
    status: i16,
    created_utc: DateTime<Utc>,
    updated_utc: Option<DateTime<Utc>>,
    published_utc: Option<DateTime<Utc>>,
    deleted_utc: Option<DateTime<Utc>>,
    deleted_by: Option<String>,
    author_id: Option<String>,
    author_name: Option<String>,
}

impl TryFrom<BlogPostRow> for BlogPost {
    type Error = DomainError;

    fn try_from(row: BlogPostRow) -> Result<Self, Self::Error> {
        Ok(BlogPost {
            id: PostId::new(row.id)?,
            blog_key: BlogKey::new(row.blog_key)?,
            title: row.title,
            slug: Slug::new(row.slug)?,
            content: row.content,
            summary: row.summary,
            hero_image_url: row.hero_image_url,
            tags: Tags::parse_delimited(&row.tags),
            status: PostStatus::from_code(row.status)?,
            created_utc: row.created_utc,
            updated_utc: row.updated_utc,
            published_utc: row.published_utc,
            deleted_utc: row.deleted_utc,
            deleted_by: row.deleted_by,
            author_id: row.author_id,
            author_name: row.author_name,
        })
    }
}

#[async_trait]
impl BlogPostWriteRepository for PostgresBlogPostWriteRepository {
    async fn upsert(&self, post: BlogPost) -> DomainResult<BlogPost> {
        let now = self.clock.now();
        let BlogPost {
            id,
            blog_key,
            title,
            slug,
            content,
            summary,
            hero_image_url,
            tags,
            status,
            published_utc,
            author_id,
            author_name,
            ..
        } = post;

        // created_utc and the delete markers are only written on insert.
        let sql = format!(
            "INSERT INTO blog_posts ({POST_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, $11, NULL, NULL, $12, $13)
             ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                slug = EXCLUDED.slug,
                content = EXCLUDED.content,
                summary = EXCLUDED.summary,
                hero_image_url = EXCLUDED.hero_image_url,
                tags = EXCLUDED.tags,
                status = EXCLUDED.status,
                updated_utc = EXCLUDED.updated_utc,
                published_utc = EXCLUDED.published_utc,
                author_id = EXCLUDED.author_id,
                author_name = EXCLUDED.author_name
             WHERE blog_posts.blog_key = EXCLUDED.blog_key
             RETURNING {POST_COLUMNS}"
        );

        let row = sqlx::query_as::<_, BlogPostRow>(&sql)
            .bind(id.as_str())
            .bind(blog_key.as_str())
            .bind(title)
            .bind(slug.as_str())
            .bind(content)
            .bind(summary)
            .bind(hero_image_url)
            .bind(tags.to_delimited())
            .bind(status.code())
            .bind(now)
            .bind(published_utc)
            .bind(author_id)
            .bind(author_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        // No row back means the id exists under another blog key.
        let row = row.ok_or_else(|| {
            DomainError::Conflict(format!("post {id} belongs to a different blog"))
        })?;

        BlogPost::try_from(row)
    }

    async fn delete(&self, blog_key: &BlogKey, id: &PostId, acting_user: &str) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let status: Option<i16> = sqlx::query_scalar(
            "SELECT status FROM blog_posts WHERE blog_key = $1 AND id = $2 FOR UPDATE",
        )
        .bind(blog_key.as_str())
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        match status.map(PostStatus::from_code).transpose()? {
            None => {}
            Some(PostStatus::Draft) => {
                sqlx::query("DELETE FROM blog_posts WHERE blog_key = $1 AND id = $2")
                    .bind(blog_key.as_str())
                    .bind(id.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx)?;
            }
            Some(_) => {
                sqlx::query(
                    "UPDATE blog_posts SET deleted_utc = $3, deleted_by = $4
                     WHERE blog_key = $1 AND id = $2 AND deleted_utc IS NULL",
                )
                .bind(blog_key.as_str())
                .bind(id.as_str())
                .bind(self.clock.now())
                .bind(acting_user)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
            }
        }

        tx.commit().await.map_err(map_sqlx)
    }
}

impl PostgresBlogPostReadRepository {
    fn apply_conditions(builder: &mut QueryBuilder<'_, Postgres>, query: &BlogQuery, as_of: DateTime<Utc>) {
        builder.push(" WHERE blog_key = ");
        builder.push_bind(query.blog_key.clone());

        if !query.include_unpublished {
            Self::push_public_predicate(builder, as_of);
        }

        if let Some(status) = query.status {
            builder.push(" AND status = ");
            builder.push_bind(status.code());
        }

        if let Some(tag) = query.tag.as_deref() {
            builder.push(
                " AND EXISTS (SELECT 1 FROM unnest(string_to_array(tags, ',')) AS t(tag) \
                 WHERE lower(trim(t.tag)) = ",
            );
            builder.push_bind(tag.trim().to_lowercase());
            builder.push(")");
        }

        if let Some(term) = query.search_term.as_deref() {
            let pattern = format!("%{}%", escape_like(term));
            builder.push(" AND (title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR content ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
    }

    fn push_public_predicate(builder: &mut QueryBuilder<'_, Postgres>, as_of: DateTime<Utc>) {
        builder.push(" AND status = ");
        builder.push_bind(PostStatus::Published.code());
        builder.push(" AND deleted_utc IS NULL AND published_utc IS NOT NULL AND published_utc <= ");
        builder.push_bind(as_of);
    }

    fn apply_ordering(builder: &mut QueryBuilder<'_, Postgres>, include_unpublished: bool) {
        if include_unpublished {
            builder.push(" ORDER BY created_utc DESC, id COLLATE \"C\" DESC");
        } else {
            builder.push(" ORDER BY published_utc DESC, id COLLATE \"C\" DESC");
        }
    }

    async fn fetch_one_where(
        &self,
        builder: &mut QueryBuilder<'_, Postgres>,
    ) -> DomainResult<Option<BlogPost>> {
        let row = builder
            .build_query_as::<BlogPostRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        row.map(BlogPost::try_from).transpose()
    }
}

#[async_trait]
impl BlogPostReadRepository for PostgresBlogPostReadRepository {
    async fn find_by_id(&self, blog_key: &BlogKey, id: &PostId) -> DomainResult<Option<BlogPost>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE blog_key = "));
        builder.push_bind(blog_key.to_string());
        builder.push(" AND id = ");
        builder.push_bind(id.to_string());

        self.fetch_one_where(&mut builder).await
    }

    async fn find_by_slug(
        &self,
        blog_key: &BlogKey,
        slug: &Slug,
        include_unpublished: bool,
    ) -> DomainResult<Option<BlogPost>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE blog_key = "));
        builder.push_bind(blog_key.to_string());
        builder.push(" AND slug = ");
        builder.push_bind(slug.to_string());
        if !include_unpublished {
            Self::push_public_predicate(&mut builder, self.clock.now());
        }

        self.fetch_one_where(&mut builder).await
    }

    async fn query(&self, query: &BlogQuery) -> DomainResult<PagedResult<BlogPost>> {
        let as_of = query.effective_now(self.clock.now());

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM blog_posts");
        Self::apply_conditions(&mut count_builder, query, as_of);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM blog_posts"));
        Self::apply_conditions(&mut builder, query, as_of);
        Self::apply_ordering(&mut builder, query.include_unpublished);
        builder.push(" LIMIT ");
        builder.push_bind(i64::from(query.page_size));
        builder.push(" OFFSET ");
        builder.push_bind(i64::try_from(query.offset()).unwrap_or(i64::MAX));

        let rows = builder
            .build_query_as::<BlogPostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        let items = rows
            .into_iter()
            .map(BlogPost::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PagedResult::new(
            items,
            query.page,
            query.page_size,
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    async fn scan_published_after(
        &self,
        blog_key: &BlogKey,
        as_of: DateTime<Utc>,
        cursor: Option<&PublishedCursor>,
        limit: u32,
    ) -> DomainResult<Vec<BlogPost>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE blog_key = "));
        builder.push_bind(blog_key.to_string());
        Self::push_public_predicate(&mut builder, as_of);

        if let Some(cursor) = cursor {
            builder.push(" AND (published_utc, id COLLATE \"C\") > (");
            builder.push_bind(cursor.published_utc);
            builder.push(", ");
            builder.push_bind(cursor.id.to_string());
            builder.push(")");
        }

        builder.push(" ORDER BY published_utc ASC, id COLLATE \"C\" ASC LIMIT ");
        builder.push_bind(i64::from(limit.max(1)));

        let rows = builder
            .build_query_as::<BlogPostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        rows.into_iter().map(BlogPost::try_from).collect()
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
