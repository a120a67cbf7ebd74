//! # Server Setup
//!
//! Application state, router assembly, tracing setup and HTTP server startup.
//!
//! A service embedding this library loads its [`Config`], builds its own
//! routes against [`AppState`], and hands both to [`start_server`]:
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use lib_core::Config;
//! use lib_web::{start_server, AppState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let routes: Router<AppState> = Router::new().route("/api/ping", get(|| async { "pong" }));
//!     start_server(config, routes).await
//! }
//! ```

// region: --- Imports
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRef,
    http::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use lib_auth::{JwtConfig, JwtService};
use lib_core::{AppError, Config, LogFormat};
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{info, Span};
use tracing_subscriber::EnvFilter;

use crate::handlers;
use crate::middleware::{
    catch_panic, cors_layer, log_requests, map_res, require_auth, stamp_req, RequestStamp,
};
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    /// Build the state from a loaded configuration.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let jwt_config = jwt_config(&config)?;
        jwt_config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self {
            jwt: Arc::new(JwtService::new(jwt_config)),
            config,
        })
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<JwtService> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

/// JWT signing settings derived from the application configuration.
pub fn jwt_config(config: &Config) -> Result<JwtConfig, AppError> {
    let access_ttl = chrono::Duration::try_minutes(config.jwt_access_ttl_minutes)
        .ok_or_else(|| AppError::Config("JWT_ACCESS_TTL_MINUTES is out of range".to_string()))?;
    let refresh_ttl = chrono::Duration::try_hours(config.jwt_refresh_ttl_hours)
        .ok_or_else(|| AppError::Config("JWT_REFRESH_TTL_HOURS is out of range".to_string()))?;

    Ok(JwtConfig {
        secret: config.jwt_secret.clone(),
        access_ttl,
        refresh_ttl,
        issuer: config.jwt_issuer.clone(),
    })
}
// endregion: --- AppState

// region: --- Tracing
/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. Calling this again after a
/// subscriber is installed does nothing.
pub fn init_tracing(default_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match default_level {
        "trace" | "debug" | "info" | "warn" | "error" => EnvFilter::new(default_level),
        _ => EnvFilter::new("info"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_file(true);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Console => builder.try_init(),
    }
    .is_ok();

    if installed {
        info!("Log level: {}, format: {:?}", default_level, format);
    }
}
// endregion: --- Tracing

// region: --- Server Setup
/// Initialize and start the HTTP server.
///
/// Serves the built-in routes plus `routes` until Ctrl-C, then drains
/// in-flight requests.
///
/// # Errors
///
/// This function will return an error if:
/// - the JWT settings in `config` are invalid
/// - the listener cannot bind `config.bind_address()`
/// - the server fails while running
pub async fn start_server(config: Config, routes: Router<AppState>) -> anyhow::Result<()> {
    init_tracing(&config.log_level, config.log_format);

    info!("Configuration: {:?}", config);

    let bind_address = config.bind_address();
    let state = AppState::new(config)?;
    let app = create_router(state, routes);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("SERVER READY: http://{}", bind_address);
    log_server_info();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Create the application router: built-in routes, caller routes and the
/// middleware stack.
///
/// Outermost first, requests pass CORS (when enabled), request stamping,
/// the trace span, request logging, response mapping and panic recovery.
pub fn create_router(state: AppState, routes: Router<AppState>) -> Router {
    info!("[ROUTE SETUP] Registering HTTP routes...");

    let protected = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route_layer(from_fn_with_state(state.jwt.clone(), require_auth));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .merge(protected)
        .merge(routes)
        .fallback(handlers::fallback)
        .with_state(state.clone())
        .layer(catch_panic())
        .layer(from_fn(map_res))
        .layer(from_fn(log_requests))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                })
                // Per-request events come from log_requests.
                .on_request(())
                .on_response(())
                .on_failure(|error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                    tracing::error!(
                        error = ?error,
                        latency_ms = latency.as_millis(),
                        "[HTTP FAILURE] {:?} after {}ms",
                        error,
                        latency.as_millis()
                    );
                }),
        )
        .layer(from_fn(stamp_req));

    if state.config.enable_cors {
        app.layer(cors_layer(&state.config.allowed_origins))
    } else {
        app
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

/// Log built-in routes
fn log_server_info() {
    info!(" AUTH:");
    info!("   • POST /api/auth/refresh");
    info!("   • GET  /api/auth/me (Bearer)");
    info!(" HEALTH:");
    info!("   • GET  /health");
}
// endregion: --- Server Setup
