use crate::domain::errors::DomainError;

const CNT_BLOG_POST_SLUG: &str = "blog_posts_blog_key_slug_key";
const CNT_BLOG_POST_STATUS_CHECK: &str = "blog_posts_status_chk";

pub fn map_sqlx(err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(constraint) = db_err.constraint() {
                return match constraint {
                    CNT_BLOG_POST_SLUG => {
                        DomainError::Conflict("slug already exists in this blog".into())
                    }
                    CNT_BLOG_POST_STATUS_CHECK => {
                        DomainError::Validation("unknown post status".into())
                    }
                    other => {
                        DomainError::Persistence(format!("database constraint violation: {other}"))
                    }
                };
            }

            if let Some(code) = db_err.code() {
                match code.as_ref() {
                    "23505" => {
                        return DomainError::Conflict("unique constraint violated".into());
                    }
                    "23514" => {
                        return DomainError::Validation("check constraint violated".into());
                    }
                    _ => {}
                }
            }

            DomainError::Persistence(db_err.message().to_string())
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_) => DomainError::Unavailable(err.to_string()),
        _ => DomainError::Persistence(err.to_string()),
    }
}

pub fn map_redis(err: redis::RedisError) -> DomainError {
    if err.is_io_error()
        || err.is_timeout()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
    {
        return DomainError::Unavailable(err.to_string());
    }
    DomainError::Persistence(err.to_string())
}

pub fn map_redis_pool(err: deadpool_redis::PoolError) -> DomainError {
    DomainError::Unavailable(err.to_string())
}

pub fn map_json(err: serde_json::Error) -> DomainError {
    DomainError::Persistence(format!("corrupt post document: {err}"))
}
