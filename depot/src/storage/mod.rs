use tokio::{fs::File, io};

pub mod driver;
pub mod paths;

/// Staging and completed areas used by the upload pipeline.
///
/// `open_*` return `Ok(None)` when the object does not exist, so callers can tell a
/// missing object apart from an I/O failure.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Creates the storage areas, optionally emptying them first.
    async fn bootstrap(&self, clean: bool) -> io::Result<()>;

    async fn create_upload_dir(&self, upload_id: &str) -> io::Result<()>;
    async fn upload_dir_exists(&self, upload_id: &str) -> io::Result<bool>;
    async fn remove_upload_dir(&self, upload_id: &str) -> io::Result<()>;

    /// Persists one chunk payload. The staged file appears atomically once complete.
    async fn write_chunk(&self, upload_id: &str, start: u32, payload: &[u8]) -> io::Result<()>;
    async fn open_chunk(&self, upload_id: &str, start: u32) -> io::Result<Option<File>>;

    async fn artifact_exists(&self, filename: &str) -> io::Result<bool>;
    /// Opens a new artifact for writing. Fails with `AlreadyExists` if one is present.
    async fn create_artifact(&self, filename: &str) -> io::Result<File>;
    async fn remove_artifact(&self, filename: &str) -> io::Result<()>;
    async fn open_artifact(&self, filename: &str) -> io::Result<Option<File>>;
}
