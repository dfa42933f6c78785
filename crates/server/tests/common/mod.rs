#![allow(dead_code)]

use blog_server::config::{AppState, Secret, ServerConfig};
use std::path::Path;

/// Config rooted in `dir` with an in-memory database and a cheap bcrypt cost
pub fn test_config(dir: &Path) -> ServerConfig {
    let mut config = ServerConfig::with_base_dir(dir);
    config.database_url = "sqlite::memory:".to_string();
    config.jwt_secret = Secret::new("integration-test-secret-0123456789");
    config.bcrypt_cost = 4;
    config.seed_defaults = false;
    config
}

pub async fn test_state(dir: &Path) -> AppState {
    blog_server::build_state(test_config(dir)).await.unwrap()
}
