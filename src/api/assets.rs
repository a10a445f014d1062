//! Embedded page and static assets
//!
//! Outside of the embedded copy, falls back to serving from the filesystem.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use std::path::PathBuf;

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

/// Serve files under `/assets/`, embedded first
pub async fn serve_static(Path(path): Path<String>) -> Response {
    let path = format!("assets/{}", path.trim_start_matches('/'));

    let content = match Assets::get(&path) {
        Some(file) => Some(file.data.into_owned()),
        None => read_from_disk(&path),
    };

    match content {
        Some(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Get the index.html content (embedded or from filesystem)
pub fn get_index_html() -> Option<String> {
    if let Some(content) = Assets::get("index.html") {
        return String::from_utf8(content.data.into_owned()).ok();
    }

    std::fs::read_to_string("ui/index.html").ok()
}

fn read_from_disk(path: &str) -> Option<Vec<u8>> {
    // Never escape the ui directory
    if path.split('/').any(|segment| segment == "..") {
        return None;
    }
    std::fs::read(PathBuf::from("ui").join(path)).ok()
}
