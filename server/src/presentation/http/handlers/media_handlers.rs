//! Media serving handlers (`/video_serve`, `/thumb_serve`, §6).
//!
//! Thumbnail generation and HLS transcoding are out of scope (§1) — these
//! handlers serve bytes that already exist on disk and never shell out to
//! an external media-processing tool. Range support mirrors the donor's own
//! `stream_media` handler: parse `Range` by hand, seek, and stream the
//! remainder with `ReaderStream`.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::infrastructure::filesystem::path_resolver::PathResolver;
use crate::presentation::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VideoServeQuery {
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct ThumbServeQuery {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub t: Option<f64>,
    #[serde(default)]
    pub w: Option<u32>,
}

fn parse_range_header(header: &str) -> Option<(u64, Option<u64>)> {
    let range = header.strip_prefix("bytes=")?;
    let mut parts = range.splitn(2, '-');
    let start = parts.next()?.parse::<u64>().ok()?;
    let end = match parts.next() {
        Some("") | None => None,
        Some(rest) => Some(rest.parse::<u64>().ok()?),
    };
    Some((start, end))
}

/// `GET /video_serve?type=&path=` — raw file with HTTP Range support.
///
/// HLS-requiring devices are out of scope: this always serves the raw
/// container, never a transcoded segment stream.
pub async fn video_serve(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VideoServeQuery>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    tracing::debug!(kind = %query.kind, path = %query.path, "video_serve");
    let resolved = PathResolver::new(&state.config)
        .resolve(&query.path)
        .map_err(|err| (StatusCode::NOT_FOUND, err.to_string()))?;

    let mut file = tokio::fs::File::open(&resolved)
        .await
        .map_err(|err| (StatusCode::NOT_FOUND, err.to_string()))?;
    let file_size = file
        .metadata()
        .await
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?
        .len();
    let content_type = mime_guess::from_path(&resolved)
        .first_or_octet_stream()
        .to_string();

    let range_header = headers.get(header::RANGE).and_then(|h| h.to_str().ok());
    if let Some((start, end)) = range_header.and_then(parse_range_header) {
        let end = end.unwrap_or(file_size.saturating_sub(1)).min(file_size.saturating_sub(1));
        if start >= file_size || start > end {
            return Err((StatusCode::RANGE_NOT_SATISFIABLE, "range not satisfiable".to_string()));
        }

        file.seek(std::io::SeekFrom::Start(start))
            .await
            .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;

        let length = end - start + 1;
        let stream = ReaderStream::new(file.take(length));
        let mut response = Response::new(Body::from_stream(stream));
        *response.status_mut() = StatusCode::PARTIAL_CONTENT;
        response.headers_mut().insert(header::CONTENT_TYPE, content_type.parse().unwrap());
        response.headers_mut().insert(header::CONTENT_LENGTH, length.to_string().parse().unwrap());
        response.headers_mut().insert(
            header::CONTENT_RANGE,
            format!("bytes {start}-{end}/{file_size}").parse().unwrap(),
        );
        response.headers_mut().insert(header::ACCEPT_RANGES, "bytes".parse().unwrap());
        return Ok(response);
    }

    let stream = ReaderStream::new(file);
    let mut response = Response::new(Body::from_stream(stream));
    response.headers_mut().insert(header::CONTENT_TYPE, content_type.parse().unwrap());
    response.headers_mut().insert(header::CONTENT_LENGTH, file_size.to_string().parse().unwrap());
    response.headers_mut().insert(header::ACCEPT_RANGES, "bytes".parse().unwrap());
    Ok(response)
}

/// `GET /thumb_serve?type=&id=&path=&t=&w=` — serves an already-cached
/// thumbnail JPEG. Generation is out of scope: a cache miss is a 404, never
/// a fallback frame extraction.
pub async fn thumb_serve(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ThumbServeQuery>,
) -> Result<Response, (StatusCode, String)> {
    tracing::debug!(kind = %query.kind, id = %query.id, path = ?query.path, t = ?query.t, w = ?query.w, "thumb_serve");
    let cached = state.config.thumbnail_cache_dir.join(format!("{}.jpg", query.id));

    let mut file = tokio::fs::File::open(&cached)
        .await
        .map_err(|_| (StatusCode::NOT_FOUND, "thumbnail not cached".to_string()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .await
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;

    let mut response = Response::new(Body::from(bytes));
    response.headers_mut().insert(header::CONTENT_TYPE, "image/jpeg".parse().unwrap());
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, "max-age=86400".parse().unwrap());
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bounded_range() {
        assert_eq!(parse_range_header("bytes=0-499"), Some((0, Some(499))));
    }

    #[test]
    fn parses_open_ended_range() {
        assert_eq!(parse_range_header("bytes=500-"), Some((500, None)));
    }

    #[test]
    fn rejects_missing_prefix() {
        assert_eq!(parse_range_header("0-499"), None);
    }

    #[test]
    fn rejects_garbage_start() {
        assert_eq!(parse_range_header("bytes=abc-499"), None);
    }
}
