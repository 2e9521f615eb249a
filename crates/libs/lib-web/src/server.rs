//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! This module wires the pieces together: configuration, the SQLite pool, the
//! chat components (identity verifier, presence registry, event router), the
//! Axum router with its middleware stack, and the listener.

// region: --- Imports
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use lib_core::{create_pool, run_migrations, Config, DbPool, MessageStore};
use crate::chat::{EventRouter, IdentityVerifier, PresenceRegistry};
use crate::handlers;
use crate::middleware::{log_requests, require_auth, stamp_req, RequestStamp};
use tower_http::cors::CorsLayer;
use tracing::info;
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub verifier: IdentityVerifier,
    pub registry: PresenceRegistry,
    pub router: EventRouter,
}

impl AppState {
    /// Build every chat component from the pool and configuration.
    ///
    /// The presence registry starts empty and lives as long as the state.
    pub fn new(db: DbPool, config: Config) -> Self {
        let registry = PresenceRegistry::new();
        let store = MessageStore::with_max_content_length(db.clone(), config.max_message_length);

        Self {
            verifier: IdentityVerifier::from_config(&config, db.clone()),
            router: EventRouter::new(store, registry.clone()),
            registry,
            db,
            config,
        }
    }
}

impl axum::extract::FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl axum::extract::FromRef<AppState> for IdentityVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

impl axum::extract::FromRef<AppState> for PresenceRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.registry.clone()
    }
}

impl axum::extract::FromRef<AppState> for EventRouter {
    fn from_ref(state: &AppState) -> Self {
        state.router.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:5000")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
fn init_tracing() -> anyhow::Result<String> {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let directive = match log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => log_level.as_str(),
        _ => "info",
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(directive))
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global tracing subscriber: {e}"))?;

    Ok(directive.to_string())
}

/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - A global tracing subscriber is already installed
/// - Configuration loading or validation fails
/// - Database connection fails
/// - Database migrations fail
/// - Server binding fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = init_tracing()?;
    info!(" HEARTH CHAT BACKEND STARTING");
    info!(" Log level: {}", log_level);

    info!("Loading configuration...");
    let app_config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    app_config.validate().map_err(|e| anyhow::anyhow!(e))?;

    info!("Database URL: {}", app_config.database_url);

    // Ensure data directory exists for SQLite database
    if let Some(db_path) = app_config.database_url.strip_prefix("sqlite:") {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!("Created database directory: {:?}", parent);
            }
        }
    }

    info!("Connecting to database...");
    let pool = create_pool(&app_config.database_url).await?;

    info!(" Running database migrations");
    run_migrations(&pool).await?;
    info!(" Migrations complete");

    let state = AppState::new(pool, app_config);
    let app = create_router(state, config.allowed_origins.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;

    info!(" SERVER READY: http://{}", config.bind_address);
    log_server_info();

    // ConnectInfo lets the socket handler log the peer address
    axum::serve(listener, app.into_make_service_with_connect_info::<std::net::SocketAddr>()).await?;
    Ok(())
}

/// Create the main application router with all routes
pub fn create_router(state: AppState, allowed_origins: Vec<String>) -> Router {
    use axum::http::{HeaderValue, Method};

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ]);

    info!("[ROUTE SETUP] Registering HTTP routes...");

    let protected = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/users", get(handlers::users::list_users))
        .route("/api/chat/send", post(handlers::chat::send_message))
        .route("/api/chat/messages/{user_id}", get(handlers::chat::get_conversation))
        .route("/api/chat/list", get(handlers::chat::get_chat_list))
        .route("/api/chat/read/{sender_id}", put(handlers::chat::mark_as_read))
        .route("/api/chat/mark-all-read", put(handlers::chat::mark_all_as_read))
        .route("/api/chat/unread-count", get(handlers::chat::get_unread_count))
        .route_layer(from_fn_with_state(state.verifier.clone(), require_auth));

    Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/ws/chat", get(handlers::websocket::chat_websocket))
        .route("/health", get(|| async { "OK" }))
        .merge(protected)
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            (axum::http::StatusCode::NOT_FOUND, "Route not found")
        })
        .with_state(state)
        // Comprehensive request/response logging
        .layer(from_fn(log_requests))
        // Tower HTTP trace layer for spans
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        path = %request.uri().path(),
                        version = ?request.version(),
                    )
                })
                .on_failure(|error: tower_http::classify::ServerErrorsFailureClass, latency: std::time::Duration, _span: &tracing::Span| {
                    tracing::error!(
                        error = ?error,
                        latency_ms = latency.as_millis(),
                        "[HTTP FAILURE] Error: {:?}, Latency: {}ms",
                        error,
                        latency.as_millis()
                    );
                })
        )
        // Request stamping runs first so the span and the logger both see the id
        .layer(from_fn(stamp_req))
        .layer(cors)
}

/// Log server information
fn log_server_info() {
    info!(" AUTH:");
    info!("   • POST /api/auth/register");
    info!("   • POST /api/auth/login");
    info!("   • GET  /api/auth/me");
    info!(" USERS:");
    info!("   • GET  /api/users");
    info!(" CHAT (REST):");
    info!("   • POST /api/chat/send");
    info!("   • GET  /api/chat/messages/{{user_id}}");
    info!("   • GET  /api/chat/list");
    info!("   • PUT  /api/chat/read/{{sender_id}}");
    info!("   • PUT  /api/chat/mark-all-read");
    info!("   • GET  /api/chat/unread-count");
    info!(" CHAT (SOCKET):");
    info!("   • GET  /api/ws/chat?token={{jwt}}");
    info!(" HEALTH:");
    info!("   • GET  /health");
}
// endregion: --- Server Setup

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_tracing_init_is_an_error() {
        let _ = init_tracing();

        assert!(init_tracing().is_err());
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_address, "127.0.0.1:5000");
        assert_eq!(config.allowed_origins.len(), 2);
    }
}
