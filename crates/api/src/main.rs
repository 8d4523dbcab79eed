mod config;
mod error;
mod middleware;
mod routes;
mod state;
mod sweeper;

use std::sync::Arc;

use gtm_site_core::auth::{hash_password, PasswordGate};
use gtm_site_core::draft::DraftPolicy;
use gtm_site_core::events::EventBus;
use gtm_site_core::media::LocalBlobStore;
use gtm_site_core::seed::load_seed_dir;
use gtm_site_core::store::{ContentStore, MemoryStore, PgStore};
use gtm_site_core::ContentService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `gtm-site-api hash-password <password>` prints a value for ADMIN_PASSWORD_HASH.
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("hash-password") {
        let password = args
            .next()
            .ok_or_else(|| anyhow::anyhow!("usage: gtm-site-api hash-password <password>"))?;
        println!("{}", hash_password(&password)?);
        return Ok(());
    }

    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    let config = config::AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    tracing::info!("Starting GTM site API server");

    let store: Arc<dyn ContentStore> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.db_max_connections, config.db_min_connections)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;
            tracing::info!("Connected to PostgreSQL");
            store
                .migrate()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;
            tracing::info!("Database migrations applied");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; content is kept in memory and lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    tokio::fs::create_dir_all(&config.media_dir).await?;
    let blobs = Arc::new(LocalBlobStore::new(
        config.media_dir.clone(),
        config.public_base_url.clone(),
    ));

    let content = ContentService::new(
        store,
        blobs,
        EventBus::new(config.event_bus_capacity),
        DraftPolicy::new(config.draft_ttl),
    );

    let password = match &config.admin_password_hash {
        Some(hash) => Some(
            PasswordGate::new(hash.as_str())
                .map_err(|e| anyhow::anyhow!("ADMIN_PASSWORD_HASH is invalid: {e}"))?,
        ),
        None => {
            tracing::warn!("ADMIN_PASSWORD_HASH not set; logins will be refused");
            None
        }
    };

    if let Some(dir) = &config.seed_dir {
        let docs = load_seed_dir(dir)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read seed directory {}: {e}", dir.display()))?;
        content.seed(docs).await?;
    }

    // DRAFT_SWEEP_SECS=0 turns the sweeper off.
    let sweeper = (!config.draft_sweep_interval.is_zero())
        .then(|| sweeper::spawn_draft_sweeper(content.clone(), config.draft_sweep_interval));

    let state = state::AppState::new(content, config.clone(), password);

    let app = routes::build_router(state)
        .layer(middleware::request_tracing::trace_layer())
        .layer(middleware::cors::cors_layer());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received Ctrl+C, shutting down..."); }
        _ = terminate => { tracing::info!("Received SIGTERM, shutting down..."); }
    }
}
