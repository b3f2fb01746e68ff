use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use game_persistence::{connection::connect_and_migrate, repositories::ShowRepository};
use game_server::{
    catalog,
    config::Config,
    create_routes,
    game_service::GameService,
    websocket::{ConnectionManager, WsEventHandler},
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Theme Timeline server...");

    let config = Config::new();
    let connection_manager = Arc::new(ConnectionManager::new());

    // Initialize database connection and run migrations
    let db = match connect_and_migrate().await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    // A fresh database gets the bundled show catalog
    if let Err(e) = catalog::seed_if_empty(&ShowRepository::new(db.clone())).await {
        tracing::error!("Failed to seed the show catalog: {}", e);
        std::process::exit(1);
    }

    let mut game_service = GameService::new(db, config.seeding_policy);
    game_service.add_event_handler(Arc::new(WsEventHandler::new(connection_manager.clone())));
    let game_service = Arc::new(game_service);

    let routes = create_routes(connection_manager.clone(), game_service);

    // Start cleanup task
    let cleanup_connection_manager = connection_manager.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            let connection_timeout = Duration::from_secs(config.connection_timeout_seconds);
            cleanup_connection_manager.cleanup_inactive_connections(connection_timeout);
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().unwrap(),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
