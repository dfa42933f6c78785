//! Centralized directory structure management for the blog backend
//!
//! Directory layout:
//! ```text
//! blog_data/
//! ├── local/           # SQLite database (blog.sqlite)
//! └── uploads/         # Cover images, one file per upload
//! ```

use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming the data root
pub const ROOT_ENV: &str = "BLOG_ROOT";

/// Data root used when `BLOG_ROOT` is not set
pub const DEFAULT_ROOT: &str = "blog_data";

/// Database file name inside the local directory
pub const DB_FILE: &str = "blog.sqlite";

/// Get the BLOG_ROOT directory from environment or default
pub fn blog_root() -> PathBuf {
    std::env::var(ROOT_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_ROOT))
}

/// Resolved directory layout under one data root
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at [`blog_root`]
    pub fn from_env() -> Self {
        Self::new(blog_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local data directory (SQLite)
    pub fn local_dir(&self) -> PathBuf {
        self.root.join("local")
    }

    /// Database file path
    pub fn db_path(&self) -> PathBuf {
        self.local_dir().join(DB_FILE)
    }

    /// Uploaded files directory
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    /// SQLite connection URL for [`DataLayout::db_path`]
    pub fn database_url(&self) -> String {
        format!(
            "sqlite://{}",
            self.db_path().to_string_lossy().replace('\\', "/")
        )
    }

    /// Create the root and every subdirectory.
    /// Call this once at startup before opening the store.
    pub fn init_structure(&self) -> anyhow::Result<PathBuf> {
        ensure_dir(&self.root)?;
        ensure_dir(&self.local_dir())?;
        ensure_dir(&self.uploads_dir())?;

        let canonical = std::fs::canonicalize(&self.root).unwrap_or_else(|_| self.root.clone());

        info!("Blog directory structure initialized at: {:?}", canonical);

        Ok(canonical)
    }
}

/// Ensure a single directory exists
pub fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        info!("Created directory: {:?}", path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let layout = DataLayout::new("/srv/blog");

        assert!(layout.local_dir().ends_with("local"));
        assert!(layout.uploads_dir().ends_with("uploads"));
        assert!(layout.db_path().ends_with("local/blog.sqlite"));
        assert!(layout.database_url().starts_with("sqlite://"));
        assert!(layout.database_url().ends_with("/local/blog.sqlite"));
    }

    #[test]
    fn test_init_structure_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new(dir.path().join("data"));

        layout.init_structure().unwrap();
        // second call is a no-op
        layout.init_structure().unwrap();

        assert!(layout.local_dir().is_dir());
        assert!(layout.uploads_dir().is_dir());
    }
}
