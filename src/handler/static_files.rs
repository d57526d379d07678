//! Static file serving from the document root.
//!
//! # Responsibilities
//! - Lexically clean the request path, then deny the reserved path before
//!   touching the filesystem
//! - Resolve `document_root + cleaned_path` and open it
//! - Hand regular files to `ServeFile` (content type, ranges, conditionals)
//! - Redirect, index or list directories
//!
//! # Design Decisions
//! - The reserved-path check is literal equality on the cleaned path, so
//!   `//forbidden.txt` and `/a/../forbidden.txt` are refused too
//! - The path is concatenated, not joined; symlinks below the root are
//!   followed, so a link pointing outside it is served
//! - Open errors map to 404/403/500 and are not distinguished further
//! - Only GET and HEAD are served; other methods get 405 once the open
//!   check has passed

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use thiserror::Error;
use tokio::fs::File;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::handler::redirect::html_escape;
use crate::http::response::text_error;
use crate::routing::{clean_path, request_path_bytes};

/// Request path that is always refused, whether or not it exists on disk.
pub const FORBIDDEN_PATH: &str = "/forbidden.txt";

const INDEX_PAGE: &str = "index.html";

/// Characters escaped in directory listing links.
const LINK_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Errors surfaced by the static file branch.
#[derive(Debug, Error)]
pub enum StaticFileError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("file not found")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for StaticFileError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => StaticFileError::NotFound,
            io::ErrorKind::PermissionDenied => StaticFileError::PermissionDenied,
            _ => StaticFileError::Io(err),
        }
    }
}

impl StaticFileError {
    pub fn status(&self) -> StatusCode {
        match self {
            StaticFileError::PermissionDenied => StatusCode::FORBIDDEN,
            StaticFileError::NotFound => StatusCode::NOT_FOUND,
            StaticFileError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StaticFileError {
    fn into_response(self) -> Response {
        let message = match self {
            StaticFileError::PermissionDenied => "403 Forbidden",
            StaticFileError::NotFound => "404 page not found",
            StaticFileError::Io(_) => "500 Internal Server Error",
        };
        text_error(self.status(), message)
    }
}

/// Serves files below a document root.
#[derive(Debug, Clone)]
pub struct StaticFileHandler {
    document_root: PathBuf,
}

impl StaticFileHandler {
    pub fn new(document_root: impl Into<PathBuf>) -> Self {
        Self {
            document_root: document_root.into(),
        }
    }

    pub fn document_root(&self) -> &Path {
        &self.document_root
    }

    /// Map a cleaned request path to its location on disk.
    ///
    /// Fails with `PermissionDenied` for [`FORBIDDEN_PATH`]; any other path is
    /// appended verbatim to the document root.
    pub fn resolve(&self, path: &[u8]) -> Result<PathBuf, StaticFileError> {
        if path == FORBIDDEN_PATH.as_bytes() {
            return Err(StaticFileError::PermissionDenied);
        }

        let mut joined = self.document_root.as_os_str().to_os_string();
        joined.push(bytes_to_os_string(path));
        Ok(PathBuf::from(joined))
    }

    /// Resolve and open `path`, returning where it lives and what it is.
    ///
    /// The handle is closed before returning.
    pub async fn open(&self, path: &[u8]) -> Result<(PathBuf, std::fs::Metadata), StaticFileError> {
        tracing::debug!(path = %String::from_utf8_lossy(path), "Request file name");
        let file_path = self.resolve(path)?;
        tracing::debug!(file_path = %file_path.display(), "Resolved file path");

        let file = File::open(&file_path).await?;
        let metadata = file.metadata().await?;
        Ok((file_path, metadata))
    }

    /// Serve the file named by the request URI.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let raw = request_path_bytes(request.uri());
        match self.serve(&raw, request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    path = %String::from_utf8_lossy(&raw),
                    error = %e,
                    "Static file request failed"
                );
                e.into_response()
            }
        }
    }

    async fn serve(&self, raw: &[u8], request: Request<Body>) -> Result<Response, StaticFileError> {
        let name = clean_path(raw);
        let (file_path, metadata) = self.open(&name).await?;

        if !metadata.is_dir() {
            return Ok(serve_file(file_path, request).await);
        }

        if !matches!(*request.method(), Method::GET | Method::HEAD) {
            return Ok(method_not_allowed());
        }

        if raw.last() != Some(&b'/') {
            return Ok(redirect_to_directory(request.uri()));
        }

        let mut index_path = name;
        if index_path.last() != Some(&b'/') {
            index_path.push(b'/');
        }
        index_path.extend_from_slice(INDEX_PAGE.as_bytes());
        if let Ok((index_file, index_meta)) = self.open(&index_path).await {
            if !index_meta.is_dir() {
                return Ok(serve_file(index_file, request).await);
            }
        }

        list_directory(&file_path).await
    }
}

#[cfg(unix)]
fn bytes_to_os_string(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(bytes).to_os_string()
}

#[cfg(not(unix))]
fn bytes_to_os_string(bytes: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(bytes).into_owned())
}

/// `405` with the same `Allow` set `ServeFile` advertises for files.
fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET,HEAD")],
    )
        .into_response()
}

async fn serve_file(file_path: PathBuf, request: Request<Body>) -> Response {
    let response = match ServeFile::new(file_path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    response.map(Body::new)
}

/// `301` to the same path with a trailing slash, keeping the query.
fn redirect_to_directory(uri: &Uri) -> Response {
    let location = match uri.query() {
        Some(query) => format!("{}/?{}", uri.path(), query),
        None => format!("{}/", uri.path()),
    };

    match HeaderValue::from_str(&location) {
        Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response(),
        Err(_) => StaticFileError::NotFound.into_response(),
    }
}

async fn list_directory(dir: &Path) -> Result<Response, StaticFileError> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().await?.is_dir();
        entries.push((name, is_dir));
    }
    entries.sort();

    let mut html = String::from(
        "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
    );
    for (name, is_dir) in &entries {
        let suffix = if *is_dir { "/" } else { "" };
        let href = utf8_percent_encode(name, LINK_ESCAPE).to_string();
        html.push_str(&format!(
            "<a href=\"{}{suffix}\">{}{suffix}</a>\n",
            html_escape(&href),
            html_escape(name),
        ));
    }
    html.push_str("</pre>\n");

    Ok((
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response())
}
