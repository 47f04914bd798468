pub mod chunk;
pub mod status;
pub mod tracker;

pub use chunk::{CHUNK_HEADER_SIZE, Chunk, ChunkHeader};
pub use status::{IngestOutcome, UploadStatus};
pub use tracker::ChunkTracker;
