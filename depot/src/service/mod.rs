pub mod auth;
pub mod download;
pub mod upload;
