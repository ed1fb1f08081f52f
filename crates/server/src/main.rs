use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autoprint_core::{
    load_config, validate_config, CupsPrinterDirectory, DocumentDownloader, DownloadTracker,
    HttpOrderStore, LpSpooler, OrderFeed, PrintQueue, PrintShop, PrinterDirectory,
    SettingsStore, SpoolerSubmitter,
};
use autoprint_server::api::create_router;
use autoprint_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("AUTOPRINT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Order store: {}", config.order_store.url);
    info!("Downloads directory: {:?}", config.downloads.dir);

    // Order store (feed + status updates)
    let order_store = Arc::new(
        HttpOrderStore::new(config.order_store.clone())
            .context("Failed to create order store client")?,
    );

    // Printers and spooler
    let directory: Arc<dyn PrinterDirectory> =
        Arc::new(CupsPrinterDirectory::new(&config.printing.lpstat_command));
    let spooler = Arc::new(LpSpooler::new(
        &config.printing.lp_command,
        u64::from(config.printing.submit_timeout_secs),
    ));

    // Persisted printer assignment, shared by the submitter and the shop
    let settings = SettingsStore::new(&config.settings.path);
    let assignment = Arc::new(RwLock::new(settings.load().await));
    info!(
        "Printer assignment loaded from {:?} (configured: {})",
        settings.path(),
        assignment.read().await.is_configured()
    );

    let submitter = Arc::new(SpoolerSubmitter::new(
        Arc::clone(&directory),
        spooler,
        Arc::clone(&assignment),
        config.printing.work_dir.clone(),
    ));

    let queue = Arc::new(PrintQueue::new(
        config.queue.clone(),
        submitter,
        Some(order_store.clone()),
    ));

    let downloader =
        DocumentDownloader::new(&config.downloads).context("Failed to create downloader")?;

    let shop = Arc::new(PrintShop::new(
        order_store.clone(),
        directory,
        DownloadTracker::new(downloader),
        queue,
        assignment,
        settings,
    ));

    // Order feed loop
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let feed: Arc<dyn OrderFeed> = order_store;
    let feed_handle = {
        let shop = Arc::clone(&shop);
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move { shop.run(feed, shutdown_rx).await })
    };
    info!("Order feed loop started");

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&shop)));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    // Stop the feed first so no new work arrives, then the queue
    let _ = shutdown_tx.send(());
    if let Err(e) = feed_handle.await {
        error!("Order feed loop failed: {}", e);
    }
    shop.stop_printing();
    info!("Print queue stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
