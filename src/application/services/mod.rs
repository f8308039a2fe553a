// src/application/services/mod.rs
use std::sync::Arc;

use crate::{
    application::{
        commands::posts::PostCommandService,
        ports::{time::Clock, util::SlugGenerator},
        queries::{posts::PostQueryService, sitemap::SitemapExporter},
    },
    config::BlogOptions,
    domain::post::{BlogPostReadRepository, BlogPostWriteRepository},
};

pub struct ApplicationServices {
    pub post_commands: Arc<PostCommandService>,
    pub post_queries: Arc<PostQueryService>,
    pub sitemap: Arc<SitemapExporter>,
}

impl ApplicationServices {
    pub fn new(
        read_repo: Arc<dyn BlogPostReadRepository>,
        write_repo: Arc<dyn BlogPostWriteRepository>,
        clock: Arc<dyn Clock>,
        slugger: Arc<dyn SlugGenerator>,
        options: BlogOptions,
    ) -> Self {
        let options = Arc::new(options);

        let post_commands = Arc::new(PostCommandService::new(
            Arc::clone(&read_repo),
            Arc::clone(&write_repo),
            Arc::clone(&slugger),
            Arc::clone(&clock),
            Arc::clone(&options),
        ));

        let post_queries = Arc::new(PostQueryService::new(
            Arc::clone(&read_repo),
            Arc::clone(&clock),
            Arc::clone(&options),
        ));

        let sitemap = Arc::new(SitemapExporter::new(
            Arc::clone(&read_repo),
            Arc::clone(&clock),
            &options,
        ));

        Self {
            post_commands,
            post_queries,
            sitemap,
        }
    }

    pub fn post_commands(&self) -> Arc<PostCommandService> {
        Arc::clone(&self.post_commands)
    }

    pub fn post_queries(&self) -> Arc<PostQueryService> {
        Arc::clone(&self.post_queries)
    }

    pub fn sitemap(&self) -> Arc<SitemapExporter> {
        Arc::clone(&self.sitemap)
    }
}
