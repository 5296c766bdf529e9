//! `bookcache` server: PostgreSQL store, Redis cache, axum HTTP.

#[macro_use]
extern crate log;

use bookcache::backend::{CacheBackend, RedisBackend};
use bookcache::config::Settings;
use bookcache::observability::CacheCounters;
use bookcache::store::{BookStore, PgBookStore};
use bookcache::{http, BookService, Result, VERSION};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; real environments set variables directly.
    let dotenv = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let settings = Settings::parse();
    info!("bookcache {} starting", VERSION);
    settings.log_summary();

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> Result<()> {
    let store = PgBookStore::connect(&settings.pg_config()).await?;
    if !store.health_check().await? {
        warn!("PostgreSQL answered the health check unexpectedly");
    }

    let backend = RedisBackend::new(&settings.redis_config()?)?;
    match backend.health_check().await {
        Ok(true) => info!("Redis reachable"),
        Ok(false) | Err(_) => warn!("Redis not reachable yet, list reads may fail until it is"),
    }

    let counters = Arc::new(CacheCounters::default());
    let service = BookService::with_metrics(
        store,
        backend,
        settings.service_config(),
        counters.clone(),
    );
    let app = http::router(service, settings.request_timeout());

    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| bookcache::Error::Config(format!("Failed to bind {}: {}", addr, e)))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| bookcache::Error::Config(format!("Server error: {}", e)))?;

    let snapshot = counters.snapshot();
    info!(
        "Shut down. Cache hits {}, misses {}, sets {}, deletes {}, errors {}",
        snapshot.hits, snapshot.misses, snapshot.sets, snapshot.deletes, snapshot.errors
    );
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
