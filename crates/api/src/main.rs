use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use motivator_api::config::ServerConfig;
use motivator_api::router::build_app_router;
use motivator_api::state::AppState;
use motivator_cache::MemoryCache;
use motivator_claude::{ClaudeClient, ClaudeConfig};
use motivator_core::batch::BatchService;
use motivator_core::encourage::MotivationService;
use motivator_core::ports::{Cache, EventPublisher, GoalTracking, NotificationLog, TextGeneration};
use motivator_events::{BusPublisher, EventBus};
use motivator_goal::{GoalServiceClient, GoalServiceConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "motivator_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = motivator_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    motivator_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    motivator_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    tracing::info!("Event bus created");

    // --- Port adapters ---
    let goals: Arc<dyn GoalTracking> = Arc::new(GoalServiceClient::new(GoalServiceConfig::from_env()));
    let textgen: Arc<dyn TextGeneration> = Arc::new(ClaudeClient::new(ClaudeConfig::from_env()));
    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
    let log: Arc<dyn NotificationLog> = Arc::new(motivator_db::PgNotificationLog::new(pool.clone()));
    let events: Arc<dyn EventPublisher> = Arc::new(BusPublisher::new(Arc::clone(&event_bus)));

    // --- Orchestrators ---
    let motivation = Arc::new(MotivationService::new(
        Arc::clone(&goals),
        Arc::clone(&textgen),
        Arc::clone(&cache),
        log,
        events,
    ));
    let batch = Arc::new(BatchService::new(goals, textgen, cache));
    tracing::info!("Motivation services wired");

    // --- Shutdown token ---
    let shutdown = CancellationToken::new();

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        motivation,
        batch,
        event_bus,
        shutdown: shutdown.clone(),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    // Stop any batch run still walking its user loop.
    shutdown.cancel();
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
