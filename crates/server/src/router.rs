//! HTTP routes
//!
//! Reads are public. Create, update, delete and upload take a `Ctx`
//! argument, which requires a valid bearer token.

use crate::auth::handlers as auth_handlers;
use crate::auth::middleware::mw_ctx_resolver;
use crate::config::AppState;
use crate::posts::handlers as post_handlers;
use crate::uploads::handlers::{upload_file, UPLOADS_PATH};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes());
    let uploads_dir = ServeDir::new(state.uploads.dir());

    Router::new()
        // Auth routes
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login))
        // Blog routes; the path segment is a slug for GET and an id otherwise
        .route(
            "/api/blogs",
            get(post_handlers::list_posts).post(post_handlers::create_post),
        )
        .route(
            "/api/blogs/{key}",
            get(post_handlers::get_post)
                .put(post_handlers::update_post)
                .delete(post_handlers::delete_post),
        )
        // Upload routes
        .route("/api/upload", post(upload_file).layer(upload_limit))
        .nest_service(UPLOADS_PATH, uploads_dir)
        // Health check
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(state.clone(), mw_ctx_resolver))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> StatusCode {
    match state.pool.acquire().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
