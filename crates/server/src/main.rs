use axum::{Router, routing::get};
use basic_oauth::AppState;
use basic_oauth::api::{Authenticated, start_webserver};
use basic_oauth::config::{StoreBackend, load_config};
use basic_oauth::session::{MemoryStore, RedisStore, SessionStore};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing() {
    let default_directives = "basic_oauth=info,tower_http=info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let layer = fmt::layer().with_target(true).with_level(true);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .init();
}

/// Demo protected page.
async fn hello(Authenticated(_subject): Authenticated) -> &'static str {
    "Hello World!"
}

async fn serve<S: SessionStore>(state: AppState<S>) -> color_eyre::Result<()> {
    if state.config.credentials.is_empty() {
        tracing::warn!("No credentials configured, every login will be rejected");
    }
    let app_routes = Router::new().route("/", get(hello));
    start_webserver(state, app_routes).await
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    initialize_tracing();

    let config = load_config()?;
    tracing::info!(
        backend = ?config.store.backend,
        token_ttl = config.token_ttl,
        secure_cookie = config.secure_cookie,
        "Configuration loaded"
    );

    match config.store.backend {
        StoreBackend::Redis => {
            let store = RedisStore::connect(&config.store.redis_url(), config.store.timeout()).await?;
            serve(AppState::new(store, config)).await
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory session store, sessions are lost on restart");
            serve(AppState::new(MemoryStore::new(), config)).await
        }
    }
}
