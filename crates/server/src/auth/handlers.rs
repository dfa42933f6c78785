//! Auth handlers

use crate::auth::{AuthResponse, Credentials};
use crate::config::AppState;
use crate::error::Result;
use axum::{extract::State, Json};
use tracing::{info, warn};

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<Json<AuthResponse>> {
    info!("POST /api/auth/register - {}", req.username);

    let token = state.auth.register(&req).await.inspect_err(|e| {
        warn!("Register failed for {}: {}", req.username, e);
    })?;

    Ok(Json(AuthResponse { token }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<Json<AuthResponse>> {
    info!("POST /api/auth/login - {}", req.username);

    let token = state.auth.login(&req).await.inspect_err(|e| {
        warn!("Login failed for {}: {}", req.username, e);
    })?;

    Ok(Json(AuthResponse { token }))
}
