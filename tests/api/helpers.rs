use actix_web::web::Data;
use once_cell::sync::Lazy;
use secrecy::Secret;

use university_portal::core::auth::authenticate;
use university_portal::core::config::{PasswordHashingConfig, SessionConfig};
use university_portal::core::{get_subscriber, init_subscriber, PasswordHashing, SessionStore};
use university_portal::db::Store;
use university_portal::seed::{seed, SeedSettings};

pub const DEMO_PASSWORD: &str = "password123";

// Set TEST_LOG to see the bunyan output of a failing test.
static TRACING: Lazy<()> = Lazy::new(|| {
    let name = "test".to_string();
    let level = "debug".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(name, level, std::io::stdout);
        let _ = init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(name, level, std::io::sink);
        let _ = init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub store: Store,
    pub sessions: Data<SessionStore>,
    pub hashing: Data<PasswordHashing>,
    pub seed_settings: Data<SeedSettings>,
}

/// Seeded in-memory portal with cheap password hashing.
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let hashing = PasswordHashing::new(&PasswordHashingConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("Failed to build password hashing");
    let password = Secret::new(DEMO_PASSWORD.to_string());

    let store = Store::in_memory();
    seed(&store, &hashing, &password)
        .await
        .expect("Failed to seed the store");

    let sessions = SessionStore::in_memory(&SessionConfig {
        ttl_minutes: 30,
        cookie_secure: false,
    });

    TestApp {
        store,
        sessions: Data::new(sessions),
        hashing: Data::new(hashing),
        seed_settings: Data::new(SeedSettings {
            default_password: password,
            allow_reset: true,
        }),
    }
}

impl TestApp {
    /// Opens a session for a seeded account and returns the bearer header value.
    pub async fn bearer(&self, login: &str) -> String {
        let identity = authenticate(&self.store, login, DEMO_PASSWORD)
            .await
            .expect("Failed to authenticate")
            .expect("Unknown demo account");
        let token = self
            .sessions
            .create(&identity)
            .await
            .expect("Failed to create session");
        format!("Bearer {}", token)
    }
}

/// Builds the portal service around a [`TestApp`].
macro_rules! init_app {
    ($app:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .configure(university_portal::routes::portal_routes)
                .app_data(actix_web::web::Data::new($app.store.clone()))
                .app_data($app.sessions.clone())
                .app_data($app.hashing.clone())
                .app_data($app.seed_settings.clone()),
        )
        .await
    };
}
