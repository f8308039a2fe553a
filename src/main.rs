use anyhow::{Result, bail};
use futures::TryStreamExt;
use quill_core::{
    application::{
        ports::{time::Clock, util::SlugGenerator},
        services::ApplicationServices,
    },
    config::{AppConfig, StorageBackend},
    domain::post::{BlogPostReadRepository, BlogPostWriteRepository},
    infrastructure::{
        database,
        repositories::{
            InMemoryBlogPostRepository, PostgresBlogPostReadRepository,
            PostgresBlogPostWriteRepository, RedisBlogPostRepository,
        },
        time::SystemClock,
        util::DefaultSlugGenerator,
    },
};
use std::{io::Write, sync::Arc};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: quill_core [sitemap | migrate]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Sitemap,
    Migrate,
}

#[tokio::main]
async fn main() {
    if let Err(err) = bootstrap().await {
        tracing::error!(error = %err, "fatal error");
        eprintln!("fatal error: {err}");
        std::process::exit(1);
    }
}

async fn bootstrap() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let command = match std::env::args().nth(1).as_deref() {
        None | Some("sitemap") => Command::Sitemap,
        Some("migrate") => Command::Migrate,
        Some(other) => bail!("unknown command {other:?}; {USAGE}"),
    };

    let config = AppConfig::from_env()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    if command == Command::Migrate {
        if config.backend() != StorageBackend::Postgres {
            tracing::info!(backend = ?config.backend(), "backend has no schema; nothing to migrate");
            return Ok(());
        }
        let pool = database::init_pool(config.database_url()?).await?;
        database::run_migrations(&pool).await?;
        tracing::info!("migrations applied");
        return Ok(());
    }

    let (read_repo, write_repo) = build_repositories(&config, Arc::clone(&clock)).await?;
    let slugger: Arc<dyn SlugGenerator> = Arc::new(DefaultSlugGenerator);
    let services = ApplicationServices::new(
        read_repo,
        write_repo,
        Arc::clone(&clock),
        slugger,
        config.blog().clone(),
    );

    tokio::select! {
        result = write_sitemap(&services) => result,
        () = shutdown_signal() => {
            tracing::warn!("sitemap export interrupted");
            Ok(())
        }
    }
}

async fn build_repositories(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<(Arc<dyn BlogPostReadRepository>, Arc<dyn BlogPostWriteRepository>)> {
    tracing::info!(backend = ?config.backend(), blog_key = %config.blog().blog_key, "opening content store");
    match config.backend() {
        StorageBackend::Postgres => {
            let pool = database::init_pool(config.database_url()?).await?;
            let read: Arc<dyn BlogPostReadRepository> = Arc::new(
                PostgresBlogPostReadRepository::new(pool.clone(), Arc::clone(&clock)),
            );
            let write: Arc<dyn BlogPostWriteRepository> =
                Arc::new(PostgresBlogPostWriteRepository::new(pool, clock));
            Ok((read, write))
        }
        StorageBackend::Redis => {
            let repo = Arc::new(RedisBlogPostRepository::from_url(config.redis_url()?, clock)?);
            let read: Arc<dyn BlogPostReadRepository> = repo.clone();
            let write: Arc<dyn BlogPostWriteRepository> = repo;
            Ok((read, write))
        }
        StorageBackend::Memory => {
            tracing::warn!("memory backend starts empty and is discarded on exit");
            let repo = Arc::new(InMemoryBlogPostRepository::new(clock));
            let read: Arc<dyn BlogPostReadRepository> = repo.clone();
            let write: Arc<dyn BlogPostWriteRepository> = repo;
            Ok((read, write))
        }
    }
}

/// One `<url>\t<lastmod>` line per public post on stdout.
async fn write_sitemap(services: &ApplicationServices) -> Result<()> {
    let exporter = services.sitemap();
    let mut stream = Box::pin(exporter.stream_public_urls());
    let mut out = std::io::stdout();
    let mut written = 0_usize;

    while let Some(item) = stream.try_next().await? {
        writeln!(out, "{}\t{}", item.url, item.last_modified.to_rfc3339())?;
        written += 1;
    }
    out.flush()?;

    tracing::info!(urls = written, "sitemap export finished");
    Ok(())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .unwrap_or_else(|| "info,sqlx=warn".to_string());

    // Logs go to stderr so stdout stays a clean sitemap.
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    if subscriber.try_init().is_err() {
        tracing::warn!("tracing subscriber already initialised");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
