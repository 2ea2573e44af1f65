use rideshare_db_gateway::api::{router, AppState};
use rideshare_db_gateway::config::Config;
use rideshare_db_gateway::pool::{release_quietly, ConnectionProvider, PostgresProvider};
use rideshare_db_gateway::query::QueryGateway;
use rideshare_db_gateway::schema::{standard_catalog, SchemaApplier};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env file if present
    let dotenv_result = dotenvy::dotenv();

    let config = Config::from_env()?;

    // Create log directory if it doesn't exist
    std::fs::create_dir_all(&config.log_dir).unwrap_or_else(|e| {
        eprintln!(
            "Warning: Could not create log directory {}: {}",
            config.log_dir.display(),
            e
        );
    });

    // Create file appender with daily rotation
    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "rideshare-db-gateway.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rideshare_db_gateway=debug")),
        )
        // Console output
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        // File output with JSON format for easy parsing
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_writer(non_blocking),
        )
        .init();

    debug!("Logging initialized - log directory: {}", config.log_dir.display());

    if let Err(e) = dotenv_result {
        warn!("No .env file found or error loading it: {}", e);
    }

    let socket_addr = config.socket_addr()?;

    info!("Starting rideshare DB gateway on {}", socket_addr);
    info!("Database: {}", config.database_name);
    info!("Max connections: {}", config.max_connections);
    info!("Fault isolation: {:?}", config.fault_isolation);
    info!("Table name policy: {:?}", config.table_name_policy);

    let catalog = Arc::new(standard_catalog());
    catalog.validate()?;
    info!("Schema catalog: {}", catalog.table_names().join(", "));

    let provider: Arc<dyn ConnectionProvider> = Arc::new(PostgresProvider::new(&config)?);

    // Ping only; requests still run (and report connection errors) if the database is down
    match provider.acquire().await {
        Ok(conn) => {
            info!("Connected to PostgreSQL database {}", provider.database());
            release_quietly(conn, "startup check").await;
        }
        Err(e) => warn!("Database not reachable at startup: {}", e),
    }

    let state = Arc::new(AppState {
        applier: SchemaApplier::new(catalog.clone(), provider.clone(), config.fault_isolation),
        gateway: QueryGateway::new(catalog, provider.clone(), config.table_name_policy),
        provider,
        start_time: Instant::now(),
    });

    let app = router(state);

    // Create listener
    let listener = tokio::net::TcpListener::bind(&socket_addr).await?;
    info!("Server listening on {}", socket_addr);

    // Run server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
