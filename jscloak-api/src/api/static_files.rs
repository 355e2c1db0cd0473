use actix_web::{http::header, web, HttpRequest, HttpResponse, Result};
use std::path::{Component, Path, PathBuf};

use crate::errors::ApiError;

/// Root directory of the single-page client.
#[derive(Debug, Clone)]
pub struct StaticRoot(pub PathBuf);

const INDEX_FILE: &str = "index.html";

/// Map a request path onto the static root. Anything that would leave the
/// root (`..`, absolute segments, prefixes) yields `None`.
fn resolve_under(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(request_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(segment) => resolved.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") | Some("map") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

async fn read_file(path: &Path) -> Option<Vec<u8>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => tokio::fs::read(path).await.ok(),
        _ => None,
    }
}

/// Serve a file from the static root. Unknown paths fall back to
/// `index.html` so client-side routes resolve.
pub async fn serve(req: HttpRequest, root: web::Data<StaticRoot>) -> Result<HttpResponse, ApiError> {
    let root = &root.0;
    let requested = resolve_under(root, req.path());

    if let Some(path) = requested {
        let path = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => path.join(INDEX_FILE),
            _ => path,
        };
        if let Some(body) = read_file(&path).await {
            return Ok(HttpResponse::Ok()
                .insert_header((header::CONTENT_TYPE, content_type_for(&path)))
                .body(body));
        }
    }

    let index = root.join(INDEX_FILE);
    match read_file(&index).await {
        Some(body) => Ok(HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, content_type_for(&index)))
            .body(body)),
        None => {
            tracing::error!(path = %index.display(), "static client index is missing");
            Ok(HttpResponse::NotFound().finish())
        }
    }
}
