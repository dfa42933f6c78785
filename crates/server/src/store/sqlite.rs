//! SQLite-backed stores
//!
//! Tables are created at startup with `CREATE TABLE IF NOT EXISTS`.
//! `users.username` and `blogs.slug` carry UNIQUE constraints, which are the
//! authoritative backstop for the existence checks done in the managers.
//!
//! SQLite's `LOWER` and `LIKE` only fold ASCII, so every post also stores
//! Rust-lowercased copies of its title and tags (`title_search`,
//! `tags_search`) and search matches against those.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

use super::{Page, PageRequest, PostFilter, PostStore, UserStore};
use crate::error::{is_unique_violation, Error, Result};
use crate::models::{BlogPost, PostInput, Role, User};

const POST_COLUMNS: &str =
    "id, title, slug, content, cover_image, tags, published, created_at, updated_at";

/// Open a pool for `database_url`, creating the database file if missing.
///
/// In-memory databases are pinned to one long-lived connection so every
/// query sees the same schema.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid database url {}", database_url))?
        .create_if_missing(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
    } else {
        SqlitePoolOptions::new().connect_with(options).await
    }
    .with_context(|| format!("connect to sqlite via {}", database_url))?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Create tables if they do not exist
pub async fn init_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("create users table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blogs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            content TEXT NOT NULL,
            cover_image TEXT,
            tags TEXT,
            published INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            title_search TEXT NOT NULL DEFAULT '',
            tags_search TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await
    .context("create blogs table")?;

    info!("[Store] Schema ready");
    Ok(())
}

/// Fixed-width RFC 3339 so text ordering matches time ordering
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Case-folded text stored in the `*_search` columns
fn search_text(text: &str) -> String {
    text.to_lowercase()
}

/// Lowercased LIKE pattern with `%`, `_` and `\` escaped
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in search_text(query).chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Result<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, role, created_at) VALUES (?, ?, ?, ?) \
             RETURNING id, username, password_hash, role, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .bind(timestamp(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::DuplicateUsername
            } else {
                e.into()
            }
        })
    }
}

pub struct SqlitePostStore {
    pool: SqlitePool,
}

impl SqlitePostStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn where_clause(filter: &PostFilter) -> &'static str {
        match filter {
            PostFilter::All => "",
            PostFilter::Published => "WHERE published = 1",
            PostFilter::Search(_) => {
                "WHERE title_search LIKE ? ESCAPE '\\' OR tags_search LIKE ? ESCAPE '\\'"
            }
        }
    }
}

#[async_trait]
impl PostStore for SqlitePostStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<BlogPost>> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {} FROM blogs WHERE id = ?",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {} FROM blogs WHERE slug = ?",
            POST_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM blogs WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(existing.is_some())
    }

    async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM blogs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, slug: &str, input: &PostInput, at: DateTime<Utc>) -> Result<BlogPost> {
        let at = timestamp(at);
        sqlx::query_as::<_, BlogPost>(&format!(
            "INSERT INTO blogs (title, slug, content, cover_image, tags, published, created_at, updated_at, \
             title_search, tags_search) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            POST_COLUMNS
        ))
        .bind(&input.title)
        .bind(slug)
        .bind(&input.content)
        .bind(&input.cover_image)
        .bind(&input.tags)
        .bind(input.published)
        .bind(&at)
        .bind(&at)
        .bind(search_text(&input.title))
        .bind(search_text(input.tags.as_deref().unwrap_or_default()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::SlugConflict(slug.to_string())
            } else {
                e.into()
            }
        })
    }

    async fn update(
        &self,
        id: i64,
        input: &PostInput,
        at: DateTime<Utc>,
    ) -> Result<Option<BlogPost>> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "UPDATE blogs SET title = ?, content = ?, cover_image = ?, tags = ?, published = ?, updated_at = ?, \
             title_search = ?, tags_search = ? WHERE id = ? RETURNING {}",
            POST_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.cover_image)
        .bind(&input.tags)
        .bind(input.published)
        .bind(timestamp(at))
        .bind(search_text(&input.title))
        .bind(search_text(input.tags.as_deref().unwrap_or_default()))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_page(&self, filter: &PostFilter, request: &PageRequest) -> Result<Page<BlogPost>> {
        let where_clause = Self::where_clause(filter);
        let sort = request.sort();
        let direction = sort.direction.keyword();

        let count_sql = format!("SELECT COUNT(*) FROM blogs {}", where_clause);
        let select_sql = format!(
            "SELECT {} FROM blogs {} ORDER BY {} {}, id {} LIMIT ? OFFSET ?",
            POST_COLUMNS,
            where_clause,
            sort.field.column(),
            direction,
            direction
        );
        debug!("[Store] {}", select_sql);

        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
        let mut select_query = sqlx::query_as::<_, BlogPost>(&select_sql);
        if let PostFilter::Search(q) = filter {
            let pattern = like_pattern(q);
            count_query = count_query.bind(pattern.clone()).bind(pattern.clone());
            select_query = select_query.bind(pattern.clone()).bind(pattern);
        }

        let (total,) = count_query.fetch_one(&self.pool).await?;
        let content = select_query
            .bind(request.size())
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(content, request, total))
    }
}
