pub mod cli;
pub mod jwt;
pub mod state;
pub mod upload_id;
pub mod validation;
