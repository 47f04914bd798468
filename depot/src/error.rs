use std::io;

use axum::Json;
use axum::http::header::{CONTENT_RANGE, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    // Client errors
    #[error("Invalid chunk: too small")]
    ChunkTooSmall,

    #[error("Invalid header")]
    InvalidHeader,

    #[error("Checksum mismatch for chunk {start}-{end} (declared {declared}, calculated {calculated})")]
    ChecksumMismatch {
        start: u32,
        end: u32,
        declared: u8,
        calculated: u8,
    },

    #[error("Invalid upload ID: {0}")]
    InvalidUploadId(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File already assembled: {0}")]
    AlreadyAssembled(String),

    #[error("No chunks found")]
    NoChunks,

    #[error("Missing chunk at {0}")]
    MissingChunk(u32),

    #[error("Incorrect credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    // Not found
    #[error("Upload ID not found: {0}")]
    UploadNotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Requested range not satisfiable (file size {size})")]
    RangeNotSatisfiable { size: u64 },

    // Internal errors
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ChunkTooSmall
            | Self::InvalidHeader
            | Self::ChecksumMismatch { .. }
            | Self::InvalidUploadId(_)
            | Self::InvalidFilename(_)
            | Self::AlreadyAssembled(_)
            | Self::NoChunks
            | Self::MissingChunk(_)
            | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::UploadNotFound(_) | Self::FileNotFound(_) => StatusCode::NOT_FOUND,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::Jwt(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// The reason shown to the client. Internal failures stay opaque.
    fn detail(&self) -> String {
        match self {
            Self::ChecksumMismatch { .. } => "Checksum mismatch".to_string(),
            Self::RangeNotSatisfiable { .. } => "Requested range not satisfiable".to_string(),
            Self::UploadNotFound(_) => "Upload ID not found".to_string(),
            Self::FileNotFound(_) => "File not found".to_string(),
            Self::InvalidUploadId(_) => "Invalid upload ID".to_string(),
            e if e.is_internal() => "an internal server error occurred".to_string(),
            e => e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let status_code = self.status_code();
        let mut headers = HeaderMap::new();
        match &self {
            Self::RangeNotSatisfiable { size } => {
                if let Ok(value) = HeaderValue::from_str(&format!("bytes */{size}")) {
                    headers.insert(CONTENT_RANGE, value);
                }
            }
            Self::Unauthorized(_) => {
                headers.insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            _ => {}
        }

        let body = ErrorBody {
            detail: self.detail(),
        };
        (status_code, headers, Json(body)).into_response()
    }
}

pub trait MapToAppError<T> {
    fn map_to_internal(self) -> Result<T, AppError>;
}

impl<T, E: std::fmt::Display> MapToAppError<T> for Result<T, E> {
    fn map_to_internal(self) -> Result<T, AppError> {
        self.map_err(|e| AppError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(AppError::ChunkTooSmall.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::AlreadyAssembled("f".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UploadNotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::RangeNotSatisfiable { size: 3 }.status_code(),
            StatusCode::RANGE_NOT_SATISFIABLE
        );
        assert!(AppError::Io(io::Error::other("disk")).is_internal());
    }

    #[test]
    fn internal_detail_is_opaque() {
        let err = AppError::Io(io::Error::other("/secret/path exploded"));
        assert!(!err.detail().contains("/secret/path"));
        assert_eq!(AppError::MissingChunk(1000).detail(), "Missing chunk at 1000");
    }

    #[test]
    fn range_error_carries_content_range() {
        let res = AppError::RangeNotSatisfiable { size: 26 }.into_response();
        assert_eq!(res.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(res.headers()[CONTENT_RANGE], "bytes */26");
    }

    #[test]
    fn unauthorized_carries_challenge() {
        let res = AppError::Unauthorized("missing token".into()).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[WWW_AUTHENTICATE], "Bearer");
    }
}
