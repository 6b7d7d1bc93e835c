use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cinelink_api::{
    config::{Config, StoreBackend},
    create_router,
    db::{self, CatalogStore, InMemoryStore, PgCatalogStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinelink_api=debug,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn CatalogStore> = match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory catalog store");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::Postgres => {
            let pool =
                db::create_pool(&config.database_url, config.database_max_connections).await?;
            db::run_migrations(&pool).await?;
            tracing::info!(
                max_connections = config.database_max_connections,
                "Connected to PostgreSQL catalog store"
            );
            Arc::new(PgCatalogStore::new(pool))
        }
    };

    let (cache, cache_writer) = match &config.redis_url {
        Some(url) => {
            let client = db::create_redis_client(url)?;
            let (cache, handle) = db::Cache::new(client).await;
            tracing::info!(ttl = config.reference_cache_ttl, "Reference data cache enabled");
            (Some(cache), Some(handle))
        }
        None => (None, None),
    };

    let state = AppState::new(store, cache, config.reference_cache_ttl);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
