//! Storage layer
//!
//! Store traits the managers depend on, plus the paged query types shared by
//! every listing. The SQLite implementations live in [`sqlite`].

pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::{BlogPost, PostInput, Role, User};

pub use sqlite::{SqlitePostStore, SqliteUserStore};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Persists users; username uniqueness is enforced by the store
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Fails with `DuplicateUsername` when the name is taken
    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Result<User>;
}

/// Persists blog posts; slug uniqueness is enforced by the store
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<BlogPost>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPost>>;

    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    async fn count(&self) -> Result<i64>;

    /// Inserts with created and updated timestamps both set to `at`.
    /// Fails with `SlugConflict` when the slug is taken.
    async fn insert(&self, slug: &str, input: &PostInput, at: DateTime<Utc>) -> Result<BlogPost>;

    /// Overwrites every mutable field and sets the updated timestamp.
    /// The slug column is never written. `None` if the id does not exist.
    async fn update(&self, id: i64, input: &PostInput, at: DateTime<Utc>)
        -> Result<Option<BlogPost>>;

    /// Returns false if the id does not exist
    async fn delete(&self, id: i64) -> Result<bool>;

    async fn find_page(&self, filter: &PostFilter, request: &PageRequest) -> Result<Page<BlogPost>>;
}

/// Row filter for paged post queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Published,
    /// Case-insensitive substring match on title or tags
    Search(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    CreatedAt,
    UpdatedAt,
    Published,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Published => "published",
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "id" => Ok(SortField::Id),
            "title" => Ok(SortField::Title),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            "published" => Ok(SortField::Published),
            other => Err(Error::InvalidInput(format!("Unknown sort field: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl FromStr for Sort {
    type Err = Error;

    /// Parses `field[,asc|desc]`. Without a direction the order is ascending.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(2, ',');
        let field = parts.next().unwrap_or_default().parse()?;
        let direction = match parts.next().map(|d| d.trim().to_ascii_lowercase()) {
            None => SortDirection::Asc,
            Some(d) if d == "asc" => SortDirection::Asc,
            Some(d) if d == "desc" => SortDirection::Desc,
            Some(d) => {
                return Err(Error::InvalidInput(format!("Unknown sort direction: {}", d)));
            }
        };
        Ok(Self { field, direction })
    }
}

/// Bounded, ordered slice request. Out-of-range values clamp instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    size: i64,
    sort: Sort,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: page.max(0),
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort: Sort::default(),
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

/// One page of results plus enough metadata to know whether more exist
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub number_of_elements: i64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let size = request.size();
        let total_pages = (total_elements + size - 1) / size;
        let number = request.page();
        let number_of_elements = content.len() as i64;
        Self {
            empty: content.is_empty(),
            content,
            number,
            size,
            total_elements,
            total_pages,
            number_of_elements,
            first: number == 0,
            last: number >= total_pages.saturating_sub(1),
        }
    }

    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }
}
