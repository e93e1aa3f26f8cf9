use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use actix_web::cookie::{time, Cookie, SameSite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::SessionConfig;
use super::{AppError, RedisHelper};
use crate::models::users::Role;

pub const SESSION_COOKIE: &str = "portal_session";

/// Who is behind a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub role: Role,
    pub display_name: String,
}

enum SessionBackend {
    Redis(RedisHelper),
    Memory(Mutex<HashMap<String, (Identity, Instant)>>),
}

/// Server-side sessions keyed by an opaque token. Every successful load
/// extends the session by the configured time to live.
pub struct SessionStore {
    backend: SessionBackend,
    ttl: Duration,
    cookie_secure: bool,
}

impl SessionStore {
    pub fn redis(helper: RedisHelper, config: &SessionConfig) -> Self {
        Self::with_backend(SessionBackend::Redis(helper), config)
    }

    pub fn in_memory(config: &SessionConfig) -> Self {
        Self::with_backend(SessionBackend::Memory(Mutex::new(HashMap::new())), config)
    }

    fn with_backend(backend: SessionBackend, config: &SessionConfig) -> Self {
        Self {
            backend,
            ttl: Duration::from_secs(config.ttl_minutes * 60),
            cookie_secure: config.cookie_secure,
        }
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }

    pub async fn create(&self, identity: &Identity) -> Result<String, AppError> {
        let token = Uuid::new_v4().to_string();

        match &self.backend {
            SessionBackend::Redis(redis) => {
                redis.put(&Self::key(&token), identity, self.ttl).await?;
            }
            SessionBackend::Memory(sessions) => {
                let mut sessions = sessions
                    .lock()
                    .map_err(|_| AppError::internal_error("session map lock poisoned"))?;
                let now = Instant::now();
                sessions.retain(|_, (_, expires_at)| *expires_at > now);
                sessions.insert(token.clone(), (identity.clone(), now + self.ttl));
            }
        }

        Ok(token)
    }

    pub async fn load(&self, token: &str) -> Result<Option<Identity>, AppError> {
        match &self.backend {
            SessionBackend::Redis(redis) => {
                Ok(redis.get_refreshed(&Self::key(token), self.ttl).await?)
            }
            SessionBackend::Memory(sessions) => {
                let mut sessions = sessions
                    .lock()
                    .map_err(|_| AppError::internal_error("session map lock poisoned"))?;
                let now = Instant::now();
                match sessions.get_mut(token) {
                    Some((identity, expires_at)) if *expires_at > now => {
                        *expires_at = now + self.ttl;
                        Ok(Some(identity.clone()))
                    }
                    Some(_) => {
                        sessions.remove(token);
                        Ok(None)
                    }
                    None => Ok(None),
                }
            }
        }
    }

    pub async fn destroy(&self, token: &str) -> Result<(), AppError> {
        match &self.backend {
            SessionBackend::Redis(redis) => {
                redis.delete(&Self::key(token)).await?;
            }
            SessionBackend::Memory(sessions) => {
                sessions
                    .lock()
                    .map_err(|_| AppError::internal_error("session map lock poisoned"))?
                    .remove(token);
            }
        }
        Ok(())
    }

    pub fn cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token.to_string())
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.ttl.as_secs() as i64))
            .finish()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .finish();
        cookie.make_removal();
        cookie
    }
}
