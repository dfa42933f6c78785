//! Blog post handlers

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::Result;
use crate::models::{BlogPost, PostInput};
use crate::store::{Page, PageRequest, Sort, DEFAULT_PAGE_SIZE};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    /// `field[,asc|desc]`, e.g. `createdAt,desc`
    pub sort: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub public_only: bool,
}

impl ListParams {
    pub fn page_request(&self) -> Result<PageRequest> {
        let sort = match self.sort.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(s) => s.parse::<Sort>()?,
            None => Sort::default(),
        };
        Ok(PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .with_sort(sort))
    }
}

/// GET /api/blogs
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<BlogPost>>> {
    info!("GET /api/blogs - {:?}", params);
    let request = params.page_request()?;

    let page = match params.search.as_deref().filter(|s| !s.is_empty()) {
        Some(query) => state.posts.search(query, &request).await?,
        None if params.public_only => state.posts.list_published(&request).await?,
        None => state.posts.list(&request).await?,
    };

    Ok(Json(page))
}

/// GET /api/blogs/{slug}
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>> {
    info!("GET /api/blogs/{}", slug);
    let post = state.posts.get_by_slug(&slug).await?;
    Ok(Json(post))
}

/// POST /api/blogs
pub async fn create_post(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(input): Json<PostInput>,
) -> Result<Json<BlogPost>> {
    info!("POST /api/blogs - {} ({})", ctx.username(), ctx.role());
    let post = state.posts.create(&input).await?;
    Ok(Json(post))
}

/// PUT /api/blogs/{id}
pub async fn update_post(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<i64>,
    Json(input): Json<PostInput>,
) -> Result<Json<BlogPost>> {
    info!("PUT /api/blogs/{} - {}", id, ctx.username());
    let post = state.posts.update(id, &input).await?;
    Ok(Json(post))
}

/// DELETE /api/blogs/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    info!("DELETE /api/blogs/{} - {}", id, ctx.username());
    state.posts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
