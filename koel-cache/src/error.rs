use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("stored job record was not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("no job record found for job {0}")]
    JobNotFound(String),
}
