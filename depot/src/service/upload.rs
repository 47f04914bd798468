use crate::domain::{Chunk, IngestOutcome, UploadStatus};
use crate::error::AppError;
use crate::utils::state::AppState;
use crate::utils::upload_id::UploadId;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{self, AsyncWriteExt, BufWriter};

/// Creates a fresh upload id for `filename` and its empty staging directory.
pub async fn initialize_upload(state: &AppState, filename: &str) -> Result<UploadId, AppError> {
    let upload_id = UploadId::generate(filename)?;
    state
        .storage
        .create_upload_dir(&upload_id.to_string())
        .await?;
    tracing::info!(%upload_id, "initialized upload");
    Ok(upload_id)
}

/// Validates one raw chunk body and stages it.
///
/// The staged file is fully written before the offset is recorded, so a tracked offset
/// always refers to a complete file. The upload's shared lock is held throughout, so a
/// merge of the same upload sees either all of this chunk or none of it.
pub async fn upload_chunk(
    state: &AppState,
    upload_id: &str,
    raw: &[u8],
) -> Result<IngestOutcome, AppError> {
    let chunk = Chunk::parse(raw)?;
    let upload_id = UploadId::parse(upload_id)?.to_string();

    let guard = state.upload_locks.shared(&upload_id).await;
    let staged = stage_chunk(state, &upload_id, &chunk).await;
    drop(guard);
    state.upload_locks.release(&upload_id).await;

    staged
}

async fn stage_chunk(
    state: &AppState,
    upload_id: &str,
    chunk: &Chunk<'_>,
) -> Result<IngestOutcome, AppError> {
    // Checked under the lock: a merge that finished first has removed the directory.
    if !state.storage.upload_dir_exists(upload_id).await? {
        return Err(AppError::UploadNotFound(upload_id.to_string()));
    }

    if state.tracker.is_uploaded(upload_id, chunk.start()).await {
        tracing::info!(%upload_id, start = chunk.start(), end = chunk.end(), "duplicate chunk");
        return Ok(IngestOutcome::Duplicate);
    }

    state
        .storage
        .write_chunk(upload_id, chunk.start(), chunk.payload)
        .await?;
    state.tracker.mark_uploaded(upload_id, chunk.start()).await;

    tracing::info!(
        %upload_id,
        start = chunk.start(),
        end = chunk.end(),
        bytes = chunk.payload.len(),
        "received chunk"
    );
    Ok(IngestOutcome::Uploaded)
}

/// Concatenates every staged chunk in ascending offset order into the completed artifact.
///
/// Holds the upload's exclusive lock, so no merge or ingest of the same id runs
/// alongside it. Returns the artifact's filename.
pub async fn merge_chunks(state: &AppState, upload_id: &str) -> Result<String, AppError> {
    let upload_id = UploadId::parse(upload_id)?;
    let key = upload_id.to_string();

    let guard = state.upload_locks.exclusive(&key).await;
    let merged = merge_locked(state, &upload_id).await;
    drop(guard);
    state.upload_locks.release(&key).await;

    merged
}

async fn merge_locked(state: &AppState, upload_id: &UploadId) -> Result<String, AppError> {
    let key = upload_id.to_string();
    let filename = upload_id.filename();

    if !state.storage.upload_dir_exists(&key).await? {
        return Err(AppError::UploadNotFound(key));
    }
    if state.storage.artifact_exists(filename).await? {
        return Err(AppError::AlreadyAssembled(filename.to_string()));
    }

    let offsets = state.tracker.get_uploaded_chunks(&key).await;
    if offsets.is_empty() {
        return Err(AppError::NoChunks);
    }

    // Exclusive create settles races between different uploads of the same filename.
    let artifact = match state.storage.create_artifact(filename).await {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Err(AppError::AlreadyAssembled(filename.to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    let written = match concat_chunks(state, &key, &offsets, artifact).await {
        Ok(written) => written,
        Err(err) => {
            if let Err(cleanup) = state.storage.remove_artifact(filename).await {
                tracing::warn!(%upload_id, error = %cleanup, "failed to remove partial artifact");
            }
            if let AppError::MissingChunk(start) = &err {
                // Only the vanished offset is dropped so a re-sent chunk is staged instead of
                // reported as duplicate. Status then lists the offsets still on disk, not
                // every offset ever ingested. See "Missing chunk during merge" in DESIGN.md.
                state.tracker.forget(&key, *start).await;
            }
            return Err(err);
        }
    };

    state.tracker.clear(&key).await;
    if let Err(err) = state.storage.remove_upload_dir(&key).await {
        tracing::warn!(%upload_id, error = %err, "failed to remove staging directory");
    }

    tracing::info!(%upload_id, chunks = offsets.len(), bytes = written, "assembled upload");
    Ok(filename.to_string())
}

async fn concat_chunks(
    state: &AppState,
    upload_id: &str,
    offsets: &[u32],
    artifact: File,
) -> Result<u64, AppError> {
    let mut writer = BufWriter::new(artifact);
    let mut written = 0;
    for &start in offsets {
        let mut chunk = state
            .storage
            .open_chunk(upload_id, start)
            .await?
            .ok_or(AppError::MissingChunk(start))?;
        written += io::copy(&mut chunk, &mut writer).await?;
    }
    writer.flush().await?;
    writer.get_ref().sync_all().await?;
    Ok(written)
}

/// Derives pending / partial / complete from the filesystem and the tracker.
pub async fn upload_status(state: &AppState, upload_id: &str) -> Result<UploadStatus, AppError> {
    let upload_id = UploadId::parse(upload_id)?;
    let key = upload_id.to_string();

    if state.storage.artifact_exists(upload_id.filename()).await? {
        return Ok(UploadStatus::Complete {
            filename: upload_id.filename().to_string(),
        });
    }
    if state.storage.upload_dir_exists(&key).await? {
        return Ok(UploadStatus::partial(
            state.tracker.get_uploaded_chunks(&key).await,
        ));
    }
    Ok(UploadStatus::pending())
}

#[derive(Deserialize)]
pub struct InitParams {
    filename: String,
}

/// POST /init?filename=<name>
pub async fn init_upload_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InitParams>,
) -> Result<impl IntoResponse, AppError> {
    let upload_id = initialize_upload(&state, &params.filename).await?;
    Ok(Json(json!({ "upload_id": upload_id.to_string() })))
}

/// POST /upload/<upload_id>
pub async fn upload_chunk_handler(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let outcome = upload_chunk(&state, &upload_id, &body).await?;
    Ok(Json(json!({ "message": outcome.message() })))
}

/// POST /merge/<upload_id>
pub async fn merge_handler(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let filename = merge_chunks(&state, &upload_id).await?;
    Ok(Json(json!({ "message": "Upload completed", "file": filename })))
}

/// GET /status/<upload_id>
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(upload_status(&state, &upload_id).await?))
}
