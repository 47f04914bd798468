use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub root_dir: PathBuf,
    pub max_chunk_bytes: usize,
    pub clean_on_start: bool,
    pub jwt_secret: String,
    pub jwt_lifetime_secs: i64,
    pub admin_username: String,
    pub admin_password: String,
}
