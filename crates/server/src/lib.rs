//! Blog Server Library
//!
//! Single-admin blog backend: token auth, post CRUD with slugs, paged
//! listing and search, and cover image uploads.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod models;
pub mod posts;
pub mod router;
pub mod seed;
pub mod store;
pub mod uploads;

use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth::{AuthManager, TokenManager};
use config::{AppState, ServerConfig};
use posts::PostManager;
use store::{PostStore, SqlitePostStore, SqliteUserStore, UserStore};
use uploads::UploadManager;

pub use error::{Error, Result};
pub use router::router;

/// Install the global tracing subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }
}

/// Wire stores and managers for `config`.
///
/// Creates the data directories, opens the database and, if enabled, seeds
/// the default admin and sample posts.
pub async fn build_state(config: ServerConfig) -> anyhow::Result<AppState> {
    config.layout.init_structure()?;
    blog_common::ensure_dir(config.upload_dir())
        .with_context(|| format!("create upload dir {:?}", config.upload_dir()))?;

    let pool = store::sqlite::connect(&config.database_url).await?;
    info!("Database: {}", config.database_url);

    let users: Arc<dyn UserStore> = Arc::new(SqliteUserStore::new(pool.clone()));
    let post_store: Arc<dyn PostStore> = Arc::new(SqlitePostStore::new(pool.clone()));

    let tokens = Arc::new(TokenManager::new(
        config.jwt_secret.expose(),
        config.token_ttl,
    ));
    let auth = Arc::new(AuthManager::new(users, tokens, config.bcrypt_cost));
    let posts = Arc::new(PostManager::new(post_store.clone()));
    let uploads = Arc::new(UploadManager::new(config.upload_dir()));

    if config.seed_defaults {
        seed::seed_defaults(&auth, post_store.as_ref())
            .await
            .context("seed defaults")?;
    }

    Ok(AppState {
        config: Arc::new(config),
        pool,
        auth,
        posts,
        uploads,
    })
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("=== Blog Server ===");

    let config = ServerConfig::from_env().context("load configuration")?;
    let addr = config.bind_addr;

    info!("Data root: {:?}", config.layout.root());
    info!("Upload directory: {:?}", config.upload_dir());
    info!("Token lifetime: {}h", config.token_ttl.num_hours());

    let state = build_state(config).await?;
    let app = router(state);

    info!("Blog server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
