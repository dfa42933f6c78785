//! Blog post management
//!
//! Slug generation, create/update/delete and the paged listings, on top of a
//! [`PostStore`].

pub mod handlers;
pub mod slug;

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::{BlogPost, PostInput};
use crate::store::{Page, PageRequest, PostFilter, PostStore};

pub struct PostManager {
    posts: Arc<dyn PostStore>,
}

impl PostManager {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    /// All posts, ordered per the request's sort
    pub async fn list(&self, request: &PageRequest) -> Result<Page<BlogPost>> {
        self.posts.find_page(&PostFilter::All, request).await
    }

    /// Published posts only
    pub async fn list_published(&self, request: &PageRequest) -> Result<Page<BlogPost>> {
        self.posts.find_page(&PostFilter::Published, request).await
    }

    /// Case-insensitive substring match on title or tags.
    /// A blank query matches nothing; otherwise the query is matched as
    /// given, surrounding spaces included.
    pub async fn search(&self, query: &str, request: &PageRequest) -> Result<Page<BlogPost>> {
        if query.trim().is_empty() {
            return Ok(Page::empty(request));
        }
        self.posts
            .find_page(&PostFilter::Search(query.to_string()), request)
            .await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<BlogPost> {
        self.posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Blog post not found with slug: {}", slug)))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<BlogPost> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_id(id))
    }

    /// Create a post with a slug derived from its title.
    ///
    /// A taken slug gets a millisecond timestamp suffix. If the store still
    /// rejects the slug the call fails with `SlugConflict`; it is not retried.
    pub async fn create(&self, input: &PostInput) -> Result<BlogPost> {
        input.validate()?;

        let now = Utc::now();
        let mut slug = slug::slugify(&input.title);
        if self.posts.exists_by_slug(&slug).await? {
            slug = slug::with_suffix(&slug, now.timestamp_millis());
        }

        let post = self.posts.insert(&slug, input, now).await.inspect_err(|e| {
            if let Error::SlugConflict(s) = e {
                warn!("[Posts] Slug collision after suffixing: {}", s);
            }
        })?;

        info!("[Posts] Created post {} ({})", post.id, post.slug);
        Ok(post)
    }

    /// Replace every mutable field. The slug never changes.
    pub async fn update(&self, id: i64, input: &PostInput) -> Result<BlogPost> {
        input.validate()?;

        let post = self
            .posts
            .update(id, input, Utc::now())
            .await?
            .ok_or_else(|| not_found_id(id))?;

        info!("[Posts] Updated post {} ({})", post.id, post.slug);
        Ok(post)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.posts.delete(id).await? {
            return Err(not_found_id(id));
        }
        info!("[Posts] Deleted post {}", id);
        Ok(())
    }
}

fn not_found_id(id: i64) -> Error {
    Error::NotFound(format!("Blog post not found with id: {}", id))
}
