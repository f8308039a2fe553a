// src/infrastructure/repositories/mod.rs
mod error;
mod memory_post;
mod postgres_post;
mod redis_post;

pub use error::{map_json, map_redis, map_redis_pool, map_sqlx};
pub use memory_post::InMemoryBlogPostRepository;
pub use postgres_post::{PostgresBlogPostReadRepository, PostgresBlogPostWriteRepository};
pub use redis_post::RedisBlogPostRepository;
