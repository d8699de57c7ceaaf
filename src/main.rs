use bookmarkd::backend::{Backend, ModelBackend};
use bookmarkd::content::SqlContentSource;
use bookmarkd::db::BookmarkStore;
use bookmarkd::registry::Registry;
use bookmarkd::router::{BookmarksState, bookmarks_router};
use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &bookmarkd::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        default_key = %cfg.default_key,
        can_remove_bookmarks = cfg.can_remove_bookmarks,
        loglevel = %cfg.loglevel,
    );

    let pool = bookmarkd::db::connect(&cfg.database_url).await?;
    let store = BookmarkStore::new(pool.clone());
    store.init_schema().await?;

    let backend: Arc<dyn Backend> = Arc::new(ModelBackend::new(store));
    let registry = Arc::new(Registry::new(backend));

    for spec in &cfg.content_types {
        match SqlContentSource::from_spec(pool.clone(), spec) {
            Ok(source) => registry.register_default(Arc::new(source))?,
            Err(e) => {
                warn!(spec = %spec, error = %e, "skipping invalid content type entry");
            }
        }
    }

    let state = BookmarksState::new(registry);
    let app = bookmarks_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    info!("shutdown signal received");
}
