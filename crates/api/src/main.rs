use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engagement_api::config::{LogFormat, ServerConfig};
use engagement_api::engine::AchievementEngine;
use engagement_api::router::build_app_router;
use engagement_api::state::AppState;
use engagement_events::{CommsDelivery, NotificationDispatcher, NotificationQueue};
use engagement_tracking::TrackingClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "engagement_api=debug,engagement_events=debug,engagement_tracking=debug,tower_http=debug"
            .into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    match LogFormat::from_env() {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = engagement_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    engagement_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    engagement_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Collaborators ---
    let tracking = TrackingClient::new(
        &config.tracking_service_url,
        config.collaborator_timeout(),
        config.tracking_max_attempts,
    )
    .expect("Failed to build tracking client");
    let comms = CommsDelivery::new(&config.comms_service_url, config.collaborator_timeout())
        .expect("Failed to build comms client");
    tracing::info!(
        tracking = %config.tracking_service_url,
        comms = comms.endpoint(),
        "Collaborator clients ready"
    );

    // --- Notification dispatcher ---
    let (queue, receiver) = NotificationQueue::channel(config.notification_queue_capacity);
    let dispatcher_cancel = CancellationToken::new();
    let dispatcher = NotificationDispatcher::new(pool.clone(), Arc::new(comms));
    let dispatcher_handle = tokio::spawn(dispatcher.run(receiver, dispatcher_cancel.clone()));

    // --- App state ---
    let engine = AchievementEngine::new(pool.clone(), Arc::new(tracking), queue);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine: Arc::new(engine),
    };

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
    tracing::info!("Server stopped accepting connections, draining notifications");

    dispatcher_cancel.cancel();
    if tokio::time::timeout(Duration::from_secs(10), dispatcher_handle)
        .await
        .is_err()
    {
        tracing::warn!("Notification dispatcher did not drain in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM (Unix) to begin graceful shutdown.
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
