use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use campus_api::config::{self, StoreBackend};
use campus_api::database::{DatabaseManager, MemorySessionStore, PgSessionStore, SessionStore};
use campus_api::middleware::JwtTenantResolver;
use campus_api::services::MaterializerSettings;
use campus_api::{app, is_production, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("campus_api=info,tower_http=info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Campus API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        tracing::warn!("JWT_SECRET is not set; every protected request will be rejected");
    }

    let store: Arc<dyn SessionStore> = match config.sessions.store {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::main_pool(&config.database)
                .await
                .context("failed to connect to database")?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await.context("failed to run migrations")?;
            }
            Arc::new(PgSessionStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory session store; data is lost on restart");
            let store = MemorySessionStore::new();
            match &config.sessions.seed_file {
                Some(path) => {
                    let json = tokio::fs::read_to_string(path)
                        .await
                        .with_context(|| format!("failed to read seed file {path}"))?;
                    let count = store
                        .load_schedules_json(&json)
                        .await
                        .with_context(|| format!("invalid schedules in {path}"))?;
                    tracing::info!("Loaded {} schedules from {}", count, path);
                }
                None => tracing::warn!("SESSIONS_SEED_FILE is not set; no schedules will match"),
            }
            Arc::new(store)
        }
    };

    let state = AppState::new(
        store,
        Arc::new(JwtTenantResolver::new(config.security.jwt_secret.clone())),
        MaterializerSettings::from(&config.sessions),
    );

    let mut router = app(state);
    if config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Campus API listening on http://{}", bind_addr);

    axum::serve(listener, router).await.context("server error")?;

    DatabaseManager::close().await;
    Ok(())
}
