// tests/support/helpers.rs
use super::mocks::ManualClock;
use quill_core::application::ports::{time::Clock, util::SlugGenerator};
use quill_core::application::services::ApplicationServices;
use quill_core::config::BlogOptions;
use quill_core::domain::post::{BlogPostReadRepository, BlogPostWriteRepository};
use quill_core::infrastructure::repositories::InMemoryBlogPostRepository;
use quill_core::infrastructure::util::DefaultSlugGenerator;
use std::sync::Arc;

/// Services wired to the in-memory store and a manual clock.
pub struct TestApp {
    pub services: ApplicationServices,
    pub repo: Arc<InMemoryBlogPostRepository>,
    pub clock: Arc<ManualClock>,
    pub options: BlogOptions,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_options(BlogOptions::default())
    }

    pub fn with_options(options: BlogOptions) -> Self {
        let clock = Arc::new(ManualClock::default());
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let repo = Arc::new(InMemoryBlogPostRepository::new(Arc::clone(&dyn_clock)));
        let read: Arc<dyn BlogPostReadRepository> = repo.clone();
        let write: Arc<dyn BlogPostWriteRepository> = repo.clone();
        let slugger: Arc<dyn SlugGenerator> = Arc::new(DefaultSlugGenerator);

        let services = ApplicationServices::new(read, write, dyn_clock, slugger, options.clone());
        Self {
            services,
            repo,
            clock,
            options,
        }
    }

    pub fn read_repo(&self) -> Arc<dyn BlogPostReadRepository> {
        self.repo.clone()
    }

    pub fn dyn_clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }
}

/// Services whose storage always reports itself unreachable.
pub fn unavailable_services() -> ApplicationServices {
    let repo = Arc::new(super::mocks::UnavailableRepo);
    let read: Arc<dyn BlogPostReadRepository> = repo.clone();
    let write: Arc<dyn BlogPostWriteRepository> = repo;
    ApplicationServices::new(
        read,
        write,
        Arc::new(ManualClock::default()),
        Arc::new(DefaultSlugGenerator),
        BlogOptions::default(),
    )
}
