use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Listening host
    #[arg(long, env = "DEPOT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Listening port
    #[arg(short, long, env = "DEPOT_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Storage root path; `uploads`, `chunks` and `completed` live below it
    #[arg(long, env = "DEPOT_ROOTDIR", default_value = "storage")]
    pub root: String,

    /// Largest accepted chunk request body, header included
    #[arg(long, env = "DEPOT_MAX_CHUNK_BYTES", default_value_t = 16 * 1024 * 1024)]
    pub max_chunk_bytes: usize,

    /// Empty all storage areas before serving
    #[arg(long, env = "DEPOT_CLEAN_ON_START", default_value_t = false)]
    pub clean_on_start: bool,
}
