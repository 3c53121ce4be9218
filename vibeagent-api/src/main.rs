//! # Vibeagent API Server
//!
//! Serves the user, household, and job endpoints over a Postgres-backed
//! (or in-memory) document store.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/vibeagent cargo run -p vibeagent-api
//! STORE_BACKEND=memory cargo run -p vibeagent-api
//! ```

use std::{future::Future, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibeagent_api::{
    app::{build_router, AppState},
    config::{Config, LogConfig, StoreBackend},
};
use vibeagent_shared::{
    db::{migrations, pool},
    store::{memory::MemoryStore, postgres::PgDocumentStore, SharedStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log);

    tracing::info!(
        "Vibeagent API Server v{} starting...",
        vibeagent_shared::VERSION
    );

    let (store, pg_store): (SharedStore, Option<Arc<PgDocumentStore>>) = match config.store.backend {
        StoreBackend::Postgres => {
            let database = config
                .store
                .database
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("Postgres backend selected without database config"))?;
            let db = pool::create_pool(database).await?;
            migrations::run_migrations(&db).await?;

            let pg = Arc::new(PgDocumentStore::new(db));
            (pg.clone() as SharedStore, Some(pg))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            (Arc::new(MemoryStore::new()) as SharedStore, None)
        }
    };

    tracing::info!(backend = %config.store.backend, "Document store ready");

    let bind_address = config.bind_address();
    let state = AppState::new(store, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pg) = pg_store {
        pool::close_pool(pg.pool().clone()).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vibeagent_api=debug,vibeagent_shared=debug,tower_http=debug".into());

    let (json_layer, text_layer) = if log.json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await;
    tracing::info!("Shutdown signal received, draining connections...");
}

/// Resolves when `signal` fires. If the listener itself fails, never
/// resolves, so the server keeps running instead of stopping at once.
async fn wait_for_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
