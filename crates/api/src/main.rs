use std::sync::Arc;

use opsview_cache::{CacheStore, MemoryCache, RedisCache};
use opsview_db::{EventStore, PgEventStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use opsview_api::config::ServerConfig;
use opsview_api::metrics::Metrics;
use opsview_api::router::build_app_router;
use opsview_api::services::StatsService;
use opsview_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        stats_ttl_secs = config.stats_cache_ttl_secs,
        "Loaded server configuration",
    );

    // --- Database ---
    // An unreachable database is logged, not fatal; requests that need it
    // fail with 500 until it comes back.
    let pool = opsview_db::create_pool(&config.database_url)?;
    let store = Arc::new(PgEventStore::new(pool.clone()));
    match store.ping().await {
        Ok(()) => {
            tracing::info!("Connected to Postgres");
            match opsview_db::run_migrations(&pool).await {
                Ok(()) => tracing::info!("Database migrations applied"),
                Err(e) => tracing::error!(error = %e, "Failed to run database migrations"),
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to connect to Postgres"),
    }

    // --- Cache ---
    let cache = connect_cache(&config).await?;

    // --- Metrics ---
    let metrics = Arc::new(Metrics::new()?);

    // --- Stats service ---
    let stats = Arc::new(StatsService::new(
        store,
        cache,
        Arc::clone(&metrics),
        config.stats_cache_ttl(),
    ));
    tracing::info!(cache_backend = stats.cache_backend(), "Stats service ready");

    // --- App state ---
    let state = AppState {
        stats,
        metrics,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server is running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, closing database pool");
    pool.close().await;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` controls filtering; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "opsview_api=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Pick the cache backend: Redis when `REDIS_URL` is set, otherwise the
/// in-process cache.
///
/// A Redis server that is down at startup is logged and retried on first
/// use; only a malformed URL is fatal.
async fn connect_cache(config: &ServerConfig) -> anyhow::Result<Arc<dyn CacheStore>> {
    let Some(url) = config.redis_url.as_deref() else {
        tracing::warn!("REDIS_URL not set, using in-process stats cache");
        return Ok(Arc::new(MemoryCache::new()));
    };

    let redis = RedisCache::open(url)?.with_timeout(config.cache_timeout());
    match redis.connect().await {
        Ok(()) => tracing::info!("Connected to Redis"),
        Err(e) => tracing::error!(
            error = %e,
            timeout_ms = config.cache_timeout_ms,
            "Failed to connect to Redis",
        ),
    }
    Ok(Arc::new(redis))
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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
