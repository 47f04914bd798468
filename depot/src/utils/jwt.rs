use crate::config::Config;
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

pub fn encode(secret: &str, claims: &Claims) -> Result<String, AppError> {
    Ok(jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn decode(secret: &str, token: &str) -> Result<Claims, AppError> {
    Ok(jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?
    .claims)
}

pub fn gen_token(config: &Config, name: &str) -> Result<String, AppError> {
    let claims = Claims {
        sub: name.to_string(),
        exp: (Utc::now() + Duration::seconds(config.jwt_lifetime_secs)).timestamp(),
    };
    encode(&config.jwt_secret, &claims)
}
