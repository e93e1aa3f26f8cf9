use std::time::Duration;

use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};

use super::{AppError, AppErrorType};

/// JSON values in Redis under a fixed key namespace, always with a time to live.
#[derive(Clone)]
pub struct RedisHelper {
    client: redis::Client,
    namespace: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum RedisError {
    #[error("Redis connection error: {0}")]
    ConnectionError(#[from] redis::RedisError),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl RedisHelper {
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
            namespace: "portal",
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, RedisError> {
        self.client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(RedisError::ConnectionError)
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), RedisError> {
        let serialized = serde_json::to_string(value)?;
        let mut conn = self.connection().await?;
        let _: () = conn
            .set_ex(self.key(key), serialized, ttl.as_secs() as usize)
            .await?;
        Ok(())
    }

    /// Reads a value and restarts its time to live in one round trip.
    pub async fn get_refreshed<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<Option<T>, RedisError> {
        let key = self.key(key);
        let mut conn = self.connection().await?;
        let (value, _): (Option<String>, bool) = redis::pipe()
            .atomic()
            .get(&key)
            .expire(&key, ttl.as_secs() as usize)
            .query_async(&mut conn)
            .await?;

        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, key: &str) -> Result<bool, RedisError> {
        let mut conn = self.connection().await?;
        let deleted: i32 = conn.del(self.key(key)).await?;
        Ok(deleted > 0)
    }
}

impl From<RedisError> for AppError {
    fn from(error: RedisError) -> Self {
        tracing::error!(error.cause = %error, "session cache unavailable");
        AppError {
            cause: Some(error.to_string()),
            message: None,
            error_type: AppErrorType::CacheError,
        }
    }
}
