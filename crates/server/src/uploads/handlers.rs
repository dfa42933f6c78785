//! Upload handlers

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info};

/// Path prefix the upload directory is served under
pub const UPLOADS_PATH: &str = "/uploads";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /api/upload
pub async fn upload_file(
    State(state): State<AppState>,
    ctx: Ctx,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    info!("POST /api/upload - {}", ctx.username());

    let mut file: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart field: {}", e);
        Error::InvalidInput(format!("Malformed multipart body: {}", e))
    })? {
        if field.name() == Some("file") {
            let filename = field.file_name().map(|s| s.to_string());
            let data = field.bytes().await.map_err(|e| {
                error!("Failed to read file data: {}", e);
                Error::InvalidInput(format!("Could not read file data: {}", e))
            })?;
            file = Some((filename, data));
        }
    }

    let (filename, data) =
        file.ok_or_else(|| Error::InvalidInput("Multipart field 'file' is required".to_string()))?;

    let stored = state.uploads.store(&data, filename.as_deref()).await?;
    let url = format!(
        "{}{}/{}",
        base_url(state.config.public_base_url.as_deref(), &headers),
        UPLOADS_PATH,
        stored
    );

    Ok(Json(UploadResponse { url }))
}

/// Configured public base, else `http://<Host>`, else empty (relative URL)
fn base_url(configured: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(base) = configured {
        return base.trim_end_matches('/').to_string();
    }
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(|host| format!("http://{}", host))
        .unwrap_or_default()
}
