// src/config.rs
use std::{env, str::FromStr};
use thiserror::Error;

use crate::domain::post::{
    DEFAULT_BLOG_KEY,
    query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    sitemap::{DEFAULT_ROUTE_PREFIX, normalize_route_prefix},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tenant-facing settings consumed by the content core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlogOptions {
    /// Default logical blog partition.
    pub blog_key: String,
    pub public_page_size: u32,
    pub admin_page_size: u32,
    /// Public URL prefix, already normalized (e.g. `/blog`).
    pub public_route_prefix: String,
    /// Author display name prefilled on new drafts.
    pub default_author_name: Option<String>,
}

impl Default for BlogOptions {
    fn default() -> Self {
        Self {
            blog_key: DEFAULT_BLOG_KEY.into(),
            public_page_size: DEFAULT_PAGE_SIZE,
            admin_page_size: 20,
            public_route_prefix: DEFAULT_ROUTE_PREFIX.into(),
            default_author_name: None,
        }
    }
}

impl BlogOptions {
    #[must_use]
    pub fn with_blog_key(mut self, blog_key: impl Into<String>) -> Self {
        self.blog_key = blog_key.into();
        self
    }

    #[must_use]
    pub fn with_route_prefix(mut self, prefix: &str) -> Self {
        self.public_route_prefix = normalize_route_prefix(prefix);
        self
    }

    #[must_use]
    pub fn with_default_author_name(mut self, name: impl Into<String>) -> Self {
        self.default_author_name = Some(name.into());
        self
    }

    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let blog_key = env::var("BLOG_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or(defaults.blog_key, |v| v.trim().to_string());
        let public_page_size = page_size_var("BLOG_PUBLIC_PAGE_SIZE", defaults.public_page_size)?;
        let admin_page_size = page_size_var("BLOG_ADMIN_PAGE_SIZE", defaults.admin_page_size)?;
        let public_route_prefix = env::var("BLOG_PUBLIC_ROUTE_PREFIX")
            .map(|v| normalize_route_prefix(&v))
            .unwrap_or(defaults.public_route_prefix);
        let default_author_name = env::var("BLOG_DEFAULT_AUTHOR_NAME")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            blog_key,
            public_page_size,
            admin_page_size,
            public_route_prefix,
            default_author_name,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Redis,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "sql" => Ok(Self::Postgres),
            "redis" | "document" => Ok(Self::Redis),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(ConfigError::Invalid(format!(
                "STORAGE_BACKEND must be postgres, redis or memory (got {other:?})"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    backend: StorageBackend,
    database_url: Option<String>,
    redis_url: Option<String>,
    blog: BlogOptions,
}

impl AppConfig {
    /// Build configuration from environment variables. Uses defaults for
    /// optional values and requires the connection URL of the chosen backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Allow dotenv files to populate env vars when present.
        dotenvy::dotenv().ok();

        let backend = env::var("STORAGE_BACKEND")
            .ok()
            .map(|v| v.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::Postgres);

        let database_url = env::var("DATABASE_URL").ok();
        let redis_url = env::var("REDIS_URL").ok();

        match backend {
            StorageBackend::Postgres if database_url.is_none() => {
                return Err(ConfigError::Missing("DATABASE_URL"));
            }
            StorageBackend::Redis if redis_url.is_none() => {
                return Err(ConfigError::Missing("REDIS_URL"));
            }
            _ => {}
        }

        Ok(Self {
            backend,
            database_url,
            redis_url,
            blog: BlogOptions::from_env()?,
        })
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }

    pub fn redis_url(&self) -> Result<&str, ConfigError> {
        self.redis_url
            .as_deref()
            .ok_or(ConfigError::Missing("REDIS_URL"))
    }

    pub fn blog(&self) -> &BlogOptions {
        &self.blog
    }
}

fn page_size_var(name: &str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::Invalid(format!("{name} must be a positive integer")))?;
            if value == 0 || value > MAX_PAGE_SIZE {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be between 1 and {MAX_PAGE_SIZE}"
                )));
            }
            Ok(value)
        }
        Err(_) => Ok(default),
    }
}
