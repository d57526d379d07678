//! Request path extraction.
//!
//! # Responsibilities
//! - Percent-decode the URI path
//! - Guarantee a leading `/`
//! - Lexically clean paths for the static branch
//!
//! # Design Decisions
//! - Classification sees the path as decoded, without cleaning
//! - File lookup works on raw decoded bytes so names that are not UTF-8
//!   still resolve
//! - Cleaning is purely lexical; symlinks are never resolved

use std::borrow::Cow;

use axum::http::Uri;
use percent_encoding::percent_decode_str;

/// Prepend `/` when the path does not already start with one.
///
/// Idempotent: `normalize_path(normalize_path(p)) == normalize_path(p)`.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{path}"))
    }
}

/// The decoded, normalized path of a request URI, for classification and
/// logging. Invalid UTF-8 is replaced.
pub fn request_path(uri: &Uri) -> String {
    String::from_utf8_lossy(&request_path_bytes(uri)).into_owned()
}

/// The decoded, normalized path of a request URI as raw bytes.
pub fn request_path_bytes(uri: &Uri) -> Vec<u8> {
    let mut decoded: Vec<u8> = percent_decode_str(uri.path()).collect();
    if decoded.first() != Some(&b'/') {
        decoded.insert(0, b'/');
    }
    decoded
}

/// Shortest rooted path equivalent to `path`, by lexical processing only.
///
/// Repeated slashes collapse, `.` segments drop, `..` removes the previous
/// segment and never climbs above `/`, and no trailing slash is kept except
/// for the root itself.
pub fn clean_path(path: &[u8]) -> Vec<u8> {
    let mut segments: Vec<&[u8]> = Vec::new();
    for segment in path.split(|&b| b == b'/') {
        match segment {
            b"" | b"." => {}
            b".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return b"/".to_vec();
    }

    let mut cleaned = Vec::with_capacity(path.len());
    for segment in segments {
        cleaned.push(b'/');
        cleaned.extend_from_slice(segment);
    }
    cleaned
}
