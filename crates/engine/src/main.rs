//! Waymark Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waymark_engine::api::auth::{USER_ID_HEADER, USER_ROLE_HEADER};
use waymark_engine::api::websocket::{ws_handler, WsState};
use waymark_engine::api::{ConnectionManager, WebSocketNotifier};
use waymark_engine::infrastructure::{
    clock::SystemClock,
    config::{EngineConfig, StorageBackend},
    memory::{InMemoryBadgeCatalog, InMemoryBadgeProgress},
    ports::{BadgeCatalogRepo, BadgeProgressRepo, ClockPort},
    seed,
    sqlite::{self, SqliteBadgeCatalogRepo, SqliteBadgeProgressRepo},
};
use waymark_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waymark_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Waymark Engine");

    let config = EngineConfig::from_env()?;
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    let (catalog_repo, progress_repo): (Arc<dyn BadgeCatalogRepo>, Arc<dyn BadgeProgressRepo>) =
        match config.storage_backend {
            StorageBackend::Sqlite => {
                tracing::info!(path = %config.badge_db_path, "Opening SQLite badge store");
                let pool = sqlite::connect(&config.badge_db_path).await?;
                (
                    Arc::new(SqliteBadgeCatalogRepo::new(pool.clone())),
                    Arc::new(SqliteBadgeProgressRepo::new(pool)),
                )
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory badge store; progress is lost on restart");
                (
                    Arc::new(InMemoryBadgeCatalog::new()),
                    Arc::new(InMemoryBadgeProgress::new()),
                )
            }
        };

    if config.seed_default_badges {
        seed::seed_if_empty(catalog_repo.as_ref(), clock.now()).await?;
    }

    let connections = Arc::new(ConnectionManager::new());
    let notifier = Arc::new(WebSocketNotifier::new(connections.clone()));

    let app = Arc::new(App::new(
        catalog_repo,
        progress_repo,
        notifier,
        clock,
        config.progress_max_retries,
    ));

    let ws_state = Arc::new(WsState {
        connections,
        channel_buffer: config.ws_channel_buffer,
    });

    // Build router with separate states for HTTP and WebSocket
    let mut router = waymark_engine::api::http::routes()
        .with_state(app)
        .route("/ws", get(ws_handler).with_state(ws_state))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
            axum::http::header::CONTENT_TYPE,
        ]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
