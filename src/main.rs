use std::sync::Arc;

use gymscore::application::handlers::router;
use gymscore::application::services::ScoringService;
use gymscore::config::ServerConfig;
use gymscore::persistence::{init_database, repository::SqliteScoreStore};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gymscore=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(
        bind_addr = %config.bind_addr,
        database = %config.database.url,
        leaderboard_cache = config.leaderboard_cache_enabled,
        leaderboard_cache_capacity = config.leaderboard_cache_capacity,
        "Starting scoring server"
    );

    let pool = init_database(&config.database).await?;
    let store = Arc::new(SqliteScoreStore::new(pool.clone()));

    let mut service = ScoringService::new(store);
    if config.leaderboard_cache_enabled {
        service = service.with_cache_capacity(config.leaderboard_cache_capacity);
    }

    let app = router(Arc::new(service), config.router_limits());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    let shutdown_signal = async {
        let ctrl_c = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("Received SIGTERM signal");
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutting down gracefully...");
    pool.close().await;
    info!("Shutdown complete");

    Ok(())
}
