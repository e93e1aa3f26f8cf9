pub mod auth;
pub mod config;
pub mod password;
pub mod redis_helper;
mod responses;
pub mod session;
mod telemetry;

pub use self::config::AppConfig;
pub use auth::{AllowedRoles, AuthContext};
pub use password::PasswordHashing;
pub use redis_helper::RedisHelper;
pub use responses::*;
pub use session::{Identity, SessionStore};
pub use telemetry::*;
