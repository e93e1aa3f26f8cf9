use std::net::TcpListener;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{dev::Server, web::Data, App, HttpServer};
use sqlx::mysql::MySqlPoolOptions;
use tracing_actix_web::TracingLogger;

use crate::core::config::DatabaseBackend;
use crate::core::{AppConfig, PasswordHashing, RedisHelper, SessionStore};
use crate::db::Store;
use crate::routes::portal_routes;
use crate::seed::{seed, SeedSettings};

pub struct UniversityWebServer {
    port: u16,
    server: Server,
}

impl UniversityWebServer {
    pub async fn build(configuration: AppConfig) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.server.host, configuration.server.port
        );

        let store = build_store(&configuration).await?;

        let sessions = match &configuration.redis {
            Some(redis) => SessionStore::redis(
                RedisHelper::new(redis.connect()?),
                &configuration.session,
            ),
            None => SessionStore::in_memory(&configuration.session),
        };

        let hashing = PasswordHashing::new(&configuration.password_hashing)?;
        let seed_settings = SeedSettings::from(&configuration.seed);

        if configuration.seed.on_startup {
            if store.portal_counts().await?.is_empty() {
                seed(&store, &hashing, &seed_settings.default_password).await?;
            } else {
                tracing::info!("store already holds data, skipping demo seed");
            }
        }

        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, store, sessions, hashing, seed_settings)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

async fn build_store(configuration: &AppConfig) -> Result<Store, anyhow::Error> {
    let database = &configuration.database;
    match database.backend {
        DatabaseBackend::Memory => Ok(Store::in_memory()),
        DatabaseBackend::Mysql => {
            let mysql = database
                .mysql
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("database.mysql is required for the mysql backend"))?;

            let pool = MySqlPoolOptions::new()
                .acquire_timeout(std::time::Duration::from_secs(5))
                .max_connections(database.max_connections)
                .connect_lazy_with(mysql.connect());

            if database.run_migrations {
                sqlx::migrate!("./migrations").run(&pool).await?;
            }

            Ok(Store::MySql(pool))
        }
    }
}

pub fn run(
    listener: TcpListener,
    store: Store,
    sessions: SessionStore,
    hashing: PasswordHashing,
    seed_settings: SeedSettings,
) -> Result<Server, anyhow::Error> {
    let store = Data::new(store);
    let sessions = Data::new(sessions);
    let hashing = Data::new(hashing);
    let seed_settings = Data::new(seed_settings);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allowed_headers(vec![
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
            ])
            .supports_credentials();
        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .configure(portal_routes)
            .app_data(store.clone())
            .app_data(sessions.clone())
            .app_data(hashing.clone())
            .app_data(seed_settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
