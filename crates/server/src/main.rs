use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doctranslate_core::{
    create_authenticator, create_queue, create_tracker, create_translator, load_config,
    validate_config, Authenticator, BlobStore, FileLibrary, FsBlobStore, MetadataStore,
    SqliteMetadataStore, TranslateOrchestrator,
};
use doctranslate_server::api::create_router;
use doctranslate_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

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

    info!("doctranslate v{}", VERSION);

    // Determine config path
    let config_path = std::env::var("DOCTRANSLATE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {}", config.auth.method.as_str());
    info!("Database path: {:?}", config.database.path);

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Stores
    let metadata: Arc<dyn MetadataStore> = Arc::new(
        SqliteMetadataStore::new(&config.database.path)
            .context("Failed to create metadata store")?,
    );
    info!("Metadata store initialized");

    let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::from_config(&config.storage));
    info!("Blob store rooted at {:?}", config.storage.root);

    // Pipeline collaborators, chosen once from config
    let queue = create_queue(&config.queue)
        .await
        .context("Failed to create task queue")?;
    info!("Task queue: {}", queue.name());

    let tracker = create_tracker(&config.tracker)
        .await
        .context("Failed to create status tracker")?;
    info!("Status tracker: {}", tracker.name());

    let translator =
        create_translator(&config.translator).context("Failed to create translator")?;
    info!("Translator: {}", translator.name());

    let orchestrator = Arc::new(TranslateOrchestrator::new(
        config.orchestrator.clone(),
        queue,
        Arc::clone(&tracker),
        Arc::clone(&blobs),
        Arc::clone(&metadata),
        translator,
    ));

    if config.orchestrator.enabled {
        orchestrator.start().await;
    } else {
        warn!("Orchestrator disabled; submissions will queue until it is started");
    }

    let library = Arc::new(FileLibrary::new(blobs, metadata, tracker));

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(
        config,
        authenticator,
        Arc::clone(&orchestrator),
        library,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Stopping orchestrator...");
    orchestrator.stop().await;
    info!("Server shut down");

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
