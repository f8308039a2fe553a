use std::sync::Arc;

use crate::{
    application::ports::ClockPort, config::BlogOptions, domain::post::BlogPostReadRepository,
};

pub struct PostQueryService {
    pub(super) read_repo: Arc<dyn BlogPostReadRepository>,
    pub(super) clock: Arc<ClockPort>,
    pub(super) options: Arc<BlogOptions>,
}

impl PostQueryService {
    pub fn new(
        read_repo: Arc<dyn BlogPostReadRepository>,
        clock: Arc<ClockPort>,
        options: Arc<BlogOptions>,
    ) -> Self {
        Self {
            read_repo,
            clock,
            options,
        }
    }
}
