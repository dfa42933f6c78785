//! Blog server configuration

use anyhow::Context;
use blog_common::DataLayout;
use sqlx::SqlitePool;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use crate::auth::AuthManager;
use crate::posts::PostManager;
use crate::uploads::UploadManager;

/// Token signing secret. Never printed.
#[derive(Clone)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Per-process secret; tokens do not survive a restart
    pub fn random() -> Self {
        Self::new(format!(
            "{}{}",
            uuid::Uuid::new_v4().simple(),
            uuid::Uuid::new_v4().simple()
        ))
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Configuration for the blog server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind_addr: SocketAddr,
    /// Data root layout (db + uploads)
    pub layout: DataLayout,
    /// SQLite connection URL
    pub database_url: String,
    /// Directory uploaded files are written to
    pub upload_dir: PathBuf,
    /// Token signing secret
    pub jwt_secret: Secret,
    /// Token lifetime
    pub token_ttl: chrono::Duration,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Max upload request size in MB
    pub max_upload_mb: usize,
    /// Base for returned upload URLs; derived from the Host header when unset
    pub public_base_url: Option<String>,
    /// Seed the admin account and sample posts at startup
    pub seed_defaults: bool,
}

impl ServerConfig {
    /// Create config with custom base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_layout(DataLayout::new(base_dir))
    }

    /// Defaults for everything except the data root
    pub fn with_layout(layout: DataLayout) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: layout.database_url(),
            upload_dir: layout.uploads_dir(),
            layout,
            jwt_secret: Secret::random(),
            token_ttl: chrono::Duration::hours(24),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            max_upload_mb: 10,
            public_base_url: None,
            seed_defaults: true,
        }
    }

    /// Resolve configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::with_layout(DataLayout::from_env());

        if let Some(addr) = env_parse::<SocketAddr>("BIND_ADDR")? {
            config.bind_addr = addr;
        }
        if let Some(url) = env_string("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(dir) = env_string("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        match env_string("JWT_SECRET") {
            Some(secret) => config.jwt_secret = Secret::new(secret),
            None => warn!("JWT_SECRET not set, using a random per-process secret"),
        }
        if let Some(hours) = env_parse::<i64>("TOKEN_TTL_HOURS")? {
            config.token_ttl = token_ttl_hours(hours).context("TOKEN_TTL_HOURS")?;
        }
        if let Some(cost) = env_parse::<u32>("BCRYPT_COST")? {
            config.bcrypt_cost = cost;
        }
        if let Some(mb) = env_parse::<usize>("MAX_UPLOAD_MB")? {
            config.max_upload_mb = mb;
        }
        config.public_base_url = env_string("PUBLIC_BASE_URL");
        if let Some(seed) = env_parse::<bool>("SEED_DEFAULTS")? {
            config.seed_defaults = seed;
        }

        Ok(config)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }
}

/// Token lifetime of `hours`; must be positive and representable
fn token_ttl_hours(hours: i64) -> anyhow::Result<chrono::Duration> {
    if hours <= 0 {
        anyhow::bail!("token lifetime must be positive, got {}h", hours);
    }
    chrono::Duration::try_hours(hours)
        .ok_or_else(|| anyhow::anyhow!("token lifetime out of range: {}h", hours))
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_string(key)
        .map(|v| v.trim().parse::<T>().with_context(|| format!("parse {}", key)))
        .transpose()
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub pool: SqlitePool,
    pub auth: Arc<AuthManager>,
    pub posts: Arc<PostManager>,
    pub uploads: Arc<UploadManager>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_base_dir_layout() {
        let config = ServerConfig::with_base_dir("/tmp/blog-test");
        assert!(config.upload_dir().ends_with("uploads"));
        assert!(config.database_url.ends_with("local/blog.sqlite"));
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
        assert!(config.seed_defaults);
    }

    #[test]
    fn test_with_layout_uses_layout_paths() {
        let layout = DataLayout::new("/srv/blog");
        let config = ServerConfig::with_layout(layout.clone());
        assert_eq!(config.layout, layout);
        assert_eq!(config.database_url, layout.database_url());
        assert_eq!(config.upload_dir, layout.uploads_dir());
    }

    #[test]
    fn test_token_ttl_hours() {
        assert_eq!(token_ttl_hours(24).unwrap(), chrono::Duration::hours(24));
        assert!(token_ttl_hours(0).is_err());
        assert!(token_ttl_hours(-3).is_err());
        assert!(token_ttl_hours(i64::MAX).is_err());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::new("super-secret");
        assert_eq!(format!("{:?}", secret), "Secret(***)");
        assert_eq!(secret.expose(), b"super-secret");
    }
}
