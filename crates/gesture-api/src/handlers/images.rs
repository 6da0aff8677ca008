//! Static gesture image handler.

use std::path::{Component, Path as FsPath};

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Serve a file from the configured images directory.
pub async fn get_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    if !is_plain_file_name(&filename) {
        return Err(ApiError::not_found(format!("File not found: {filename}")));
    }

    let path = state.config.images_dir.join(&filename);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        debug!(path = %path.display(), error = %e, "Image not served");
        ApiError::not_found(format!("File not found: {filename}"))
    })?;

    Ok(([(header::CONTENT_TYPE, content_type_for(&filename))], bytes).into_response())
}

/// A single normal path component: no separators, no `..`, no root.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = FsPath::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains('\\')
}

fn content_type_for(name: &str) -> &'static str {
    let ext = FsPath::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
