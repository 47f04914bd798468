use crate::error::AppError;
use crate::utils::jwt::gen_token;
use crate::utils::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct TokenRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    access_token: String,
    token_type: &'static str,
    expires_in: i64,
}

/// POST /token
///
/// Exchanges the configured admin credentials for a bearer token.
pub async fn token_handler(
    State(state): State<Arc<AppState>>,
    Form(req): Form<TokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = &state.config;
    if req.username != config.admin_username || req.password != config.admin_password {
        return Err(AppError::InvalidCredentials);
    }
    let token = gen_token(config, &req.username)?;
    tracing::info!(user = %req.username, "issued token");
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
        expires_in: config.jwt_lifetime_secs,
    }))
}
