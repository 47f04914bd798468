use crate::error::{AppError, MapToAppError};
use crate::utils::state::AppState;
use crate::utils::validation::{RequestedRange, is_valid_filename, parse_range_header};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use axum::http::{HeaderMap, Response, StatusCode};
use std::io::SeekFrom;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, Take};
use tokio_util::io::ReaderStream;

/// Upper bound on a single buffer yielded by a download stream.
pub const STREAM_BUFFER_SIZE: usize = 4096;

/// Lazily reads `[start, end]` of an artifact, one bounded buffer per poll.
pub type ByteStream = ReaderStream<Take<File>>;

pub struct Download {
    pub stream: ByteStream,
    pub start: u64,
    pub end: u64,
    /// Number of bytes the stream yields.
    pub len: u64,
    /// Size of the whole artifact.
    pub size: u64,
    pub partial: bool,
}

impl Download {
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.size)
    }
}

/// Opens a completed artifact for streaming, whole or restricted to `range`.
///
/// A missing range end means "until the end of the file". A range that starts or ends
/// at or beyond the file size, or ends before it starts, is not satisfiable.
pub async fn open_download(
    state: &AppState,
    filename: &str,
    range: Option<RequestedRange>,
) -> Result<Download, AppError> {
    if !is_valid_filename(filename) {
        return Err(AppError::FileNotFound(filename.to_string()));
    }
    let mut file = state
        .storage
        .open_artifact(filename)
        .await?
        .ok_or_else(|| AppError::FileNotFound(filename.to_string()))?;
    let size = file.metadata().await?.len();

    let (start, end, len, partial) = match range {
        Some(range) => {
            let end = range.end.unwrap_or(size.saturating_sub(1));
            if range.start >= size || end >= size || range.start > end {
                return Err(AppError::RangeNotSatisfiable { size });
            }
            (range.start, end, end - range.start + 1, true)
        }
        None => (0, size.saturating_sub(1), size, false),
    };

    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }
    let stream = ReaderStream::with_capacity(file.take(len), STREAM_BUFFER_SIZE);

    Ok(Download {
        stream,
        start,
        end,
        len,
        size,
        partial,
    })
}

/// GET /download/<filename>
pub async fn download_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response<Body>, AppError> {
    let range = headers
        .get(RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_range_header);

    let download = open_download(&state, &filename, range).await?;

    let mut response = Response::builder()
        .header(CONTENT_TYPE, "application/octet-stream")
        .header(ACCEPT_RANGES, "bytes")
        .header(CONTENT_LENGTH, download.len);
    if download.partial {
        tracing::info!(%filename, start = download.start, end = download.end, "sending range");
        response = response
            .status(StatusCode::PARTIAL_CONTENT)
            .header(CONTENT_RANGE, download.content_range());
    } else {
        tracing::info!(%filename, size = download.size, "sending full file");
        response = response.status(StatusCode::OK);
    }

    response
        .body(Body::from_stream(download.stream))
        .map_to_internal()
}
