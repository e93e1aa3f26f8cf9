use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use sqlx::mysql::MySqlConnectOptions;
use sqlx::ConnectOptions;

#[derive(Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: Option<RedisConfig>,
    pub session: SessionConfig,
    #[serde(default)]
    pub password_hashing: PasswordHashingConfig,
    pub seed: SeedConfig,
    pub log: LogConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self, config::ConfigError> {
        let base_path = std::env::current_dir()
            .map_err(|e| config::ConfigError::Message(format!("Failed to find the current dir: {}", e)))?;
        let config_dir = base_path.join("src/core/configurations");

        let app_environment: Environment = std::env::var("UNIVERSITY_PORTAL_APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .map_err(config::ConfigError::Message)?;

        let configurations = config::Config::builder()
            .add_source(
                config::File::from(config_dir.join(app_environment.as_str())).required(true),
            )
            // e.g. APP__SERVER__PORT=8081 overrides server.port
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        configurations.try_deserialize()
    }
}

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Mysql,
    Memory,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub mysql: Option<MySqlConfig>,
    #[serde(default)]
    pub run_migrations: bool,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Deserialize, Clone)]
pub struct MySqlConfig {
    pub username: String,
    pub password: Secret<String>,
    pub host: String,
    pub port: u16,
    pub database_name: String,
}

impl MySqlConfig {
    pub fn connect(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .database(&self.database_name);

        options.log_statements(tracing::log::LevelFilter::Trace)
    }
}

#[derive(Deserialize, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: String,
    pub password: Option<Secret<String>>,
}

impl RedisConfig {
    pub fn connect(&self) -> Result<redis::Client, redis::RedisError> {
        let url = format!(
            "redis://:{password}@{host}:{port}",
            password = self
                .password
                .as_ref()
                .map(|p| p.expose_secret().as_str())
                .unwrap_or(""),
            host = self.host,
            port = self.port
        );
        redis::Client::open(url)
    }
}

#[derive(Deserialize, Clone)]
pub struct SessionConfig {
    pub ttl_minutes: u64,
    #[serde(default)]
    pub cookie_secure: bool,
}

/// Argon2id cost parameters used when hashing new passwords.
#[derive(Deserialize, Clone, Debug)]
pub struct PasswordHashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct SeedConfig {
    #[serde(default)]
    pub on_startup: bool,
    pub default_password: Secret<String>,
    #[serde(default)]
    pub allow_reset: bool,
}

#[derive(Deserialize, Clone)]
pub struct LogConfig {
    pub directory: String,
    pub level: String,
}

pub enum Environment {
    Local,
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not supported environment. Use either `local`, `sandbox` or `production` ",
                other
            )),
        }
    }
}
