//! HTTP layer. Paths below are the defaults, see `EndpointsConfig`.
//!
//! - `login` - password grant (`POST /login`)
//! - `logout` - token revocation (`GET /logout`)
//! - `script` - browser helper (`GET /js/oauth_client.js`)
//! - `auth` - guard for the application's own protected routes
//! - `health` - liveness (`/healthz`)
//! - `openapi` - OpenAPI/Utoipa configuration, served at `/api-docs`

pub mod auth;
pub mod client;
pub mod health;
pub mod login;
pub mod logout;
pub mod openapi;
pub mod script;

pub use auth::{Authenticated, require_session};
pub use health::MISC_TAG;

use crate::config::{AppConfig, EndpointsConfig};
use crate::session::SessionStore;
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{MethodRouter, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Tag for OpenAPI documentation.
pub const OAUTH_TAG: &str = "OAuth";

/// Login, logout and helper script routes, at the paths `endpoints` names.
/// Endpoints without a path are not mounted.
pub fn oauth_router<S: SessionStore>(endpoints: &EndpointsConfig) -> OpenApiRouter<AppState<S>> {
    let mut router = OpenApiRouter::new();
    if let Some(path) = endpoints.login_path() {
        router = mount(
            router,
            path,
            post(login::login::<S>),
            OpenApiRouter::new().routes(routes!(login::login)),
        );
    }
    if let Some(path) = endpoints.logout_path() {
        router = mount(
            router,
            path,
            get(logout::logout::<S>),
            OpenApiRouter::new().routes(routes!(logout::logout)),
        );
    }
    if let Some(path) = endpoints.script_path() {
        router = mount(
            router,
            path,
            get(script::oauth_client_script),
            OpenApiRouter::new().routes(routes!(script::oauth_client_script)),
        );
    }
    router
}

/// Serve `handler` at `path` and document it with the operation `documented`
/// carries, moved from its annotated path to `path`.
fn mount<S: SessionStore>(
    router: OpenApiRouter<AppState<S>>,
    path: &str,
    handler: MethodRouter<AppState<S>>,
    documented: OpenApiRouter<AppState<S>>,
) -> OpenApiRouter<AppState<S>> {
    let (_, mut api) = documented.split_for_parts();
    let operations = std::mem::take(&mut api.paths.paths);
    for (_, item) in operations {
        api.paths.paths.insert(path.to_string(), item);
    }
    router.merge(OpenApiRouter::with_openapi(api).route(path, handler))
}

/// CORS policy for the configured origin, if any.
fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    let origin = config.allow_origin.as_deref()?;
    match HeaderValue::from_str(origin) {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([CONTENT_TYPE]),
        ),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Ignoring invalid allow_origin");
            None
        }
    }
}

/// The complete application.
///
/// `app_routes` are the embedding application's own routes. They share the
/// state so their handlers can use [`Authenticated`] or sit behind
/// [`require_session`].
pub fn build_router<S: SessionStore>(state: AppState<S>, app_routes: Router<AppState<S>>) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .merge(oauth_router::<S>(&state.config.endpoints))
        .routes(routes!(health::health))
        .split_for_parts();

    let cors = cors_layer(&state.config);
    let router = router
        .merge(app_routes)
        .with_state(state)
        .merge(Redoc::with_url("/api-docs", api));
    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };
    router.layer(TraceLayer::new_for_http())
}

/// Serve the application on the configured address until the process stops.
#[tracing::instrument(skip(state, app_routes))]
pub async fn start_webserver<S: SessionStore>(
    state: AppState<S>,
    app_routes: Router<AppState<S>>,
) -> color_eyre::Result<()> {
    let addr = state.config.listen_addr.clone();
    let router = build_router(state, app_routes);

    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
