use std::sync::Arc;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::IntoResponse;
use crate::error::AppError;
use crate::utils::jwt::{Claims, decode};
use crate::utils::state::AppState;

/// Rejects requests without a valid bearer token and stores the claims in the
/// request extensions for the handlers.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AppError> {
    let claims = extract_claims(&req, &state.config.jwt_secret)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn extract_claims(req: &Request, secret: &str) -> Result<Claims, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing or malformed Bearer token".to_string()))?;
    decode(secret, token.trim())
}
