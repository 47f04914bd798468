pub mod middleware;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Router, middleware::from_fn_with_state};
use tower_http::trace::TraceLayer;

use crate::api::middleware::authenticate;
use crate::service::auth::token_handler;
use crate::service::download::download_handler;
use crate::service::upload::{
    init_upload_handler, merge_handler, status_handler, upload_chunk_handler,
};
use crate::utils::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { StatusCode::OK }))
        .route("/token", post(token_handler))
        .merge(file_router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn file_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let max_chunk_bytes = state.config.max_chunk_bytes;
    Router::new()
        .route("/init", post(init_upload_handler))
        .route("/upload/{upload_id}", post(upload_chunk_handler))
        .route("/merge/{upload_id}", post(merge_handler))
        .route("/download/{filename}", get(download_handler))
        .route("/status/{upload_id}", get(status_handler))
        .layer(DefaultBodyLimit::max(max_chunk_bytes))
        .route_layer(from_fn_with_state(state, authenticate))
}
