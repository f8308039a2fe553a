// src/application/commands/posts/service.rs
use std::sync::Arc;

use crate::{
    application::ports::{ClockPort, SlugGeneratorPort},
    config::BlogOptions,
    domain::post::{BlogPostReadRepository, BlogPostWriteRepository},
};

/// Publishing workflow: validation, timestamp bookkeeping and slug
/// assignment on top of the storage boundary.
pub struct PostCommandService {
    pub(super) read_repo: Arc<dyn BlogPostReadRepository>,
    pub(super) write_repo: Arc<dyn BlogPostWriteRepository>,
    pub(super) slugger: Arc<SlugGeneratorPort>,
    pub(super) clock: Arc<ClockPort>,
    pub(super) options: Arc<BlogOptions>,
}

impl PostCommandService {
    pub fn new(
        read_repo: Arc<dyn BlogPostReadRepository>,
        write_repo: Arc<dyn BlogPostWriteRepository>,
        slugger: Arc<SlugGeneratorPort>,
        clock: Arc<ClockPort>,
        options: Arc<BlogOptions>,
    ) -> Self {
        Self {
            read_repo,
            write_repo,
            slugger,
            clock,
            options,
        }
    }
}
