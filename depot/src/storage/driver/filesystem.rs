use std::path::Path;

use crate::storage::Storage;
use crate::storage::paths::PathManager;

use tokio::{
    fs::{
        File, OpenOptions, create_dir_all, read_dir, remove_dir_all, remove_file, rename,
        try_exists,
    },
    io::{self, AsyncWriteExt},
};

pub struct FilesystemStorage {
    path_manager: PathManager,
}

impl FilesystemStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        FilesystemStorage {
            path_manager: PathManager::new(root),
        }
    }
}

async fn open_if_exists(path: &Path) -> io::Result<Option<File>> {
    match File::open(path).await {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

async fn empty_dir(path: &Path) -> io::Result<()> {
    let mut entries = read_dir(path).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            remove_dir_all(entry.path()).await?;
        } else {
            remove_file(entry.path()).await?;
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl Storage for FilesystemStorage {
    async fn bootstrap(&self, clean: bool) -> io::Result<()> {
        for area in self.path_manager.areas() {
            if try_exists(&area).await? {
                if clean {
                    empty_dir(&area).await?;
                }
            } else {
                create_dir_all(&area).await?;
            }
        }
        Ok(())
    }

    async fn create_upload_dir(&self, upload_id: &str) -> io::Result<()> {
        create_dir_all(self.path_manager.upload_chunks_path(upload_id)).await
    }

    async fn upload_dir_exists(&self, upload_id: &str) -> io::Result<bool> {
        try_exists(self.path_manager.upload_chunks_path(upload_id)).await
    }

    async fn remove_upload_dir(&self, upload_id: &str) -> io::Result<()> {
        remove_dir_all(self.path_manager.upload_chunks_path(upload_id)).await
    }

    async fn write_chunk(&self, upload_id: &str, start: u32, payload: &[u8]) -> io::Result<()> {
        let chunk_path = self.path_manager.chunk_path(upload_id, start);
        // Write beside the final name and rename, so a concurrent reader sees either
        // nothing or a complete chunk.
        let tmp_path = chunk_path.with_extension(format!(
            "part.{}.tmp",
            uuid::Uuid::new_v4().simple()
        ));

        let written = async {
            let mut file = File::create(&tmp_path).await?;
            file.write_all(payload).await?;
            file.sync_all().await?;
            rename(&tmp_path, &chunk_path).await
        }
        .await;

        if written.is_err() {
            match remove_file(&tmp_path).await {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => tracing::warn!(
                    path = %tmp_path.display(),
                    error = %err,
                    "failed to remove temporary chunk file"
                ),
            }
        }
        written
    }

    async fn open_chunk(&self, upload_id: &str, start: u32) -> io::Result<Option<File>> {
        open_if_exists(&self.path_manager.chunk_path(upload_id, start)).await
    }

    async fn artifact_exists(&self, filename: &str) -> io::Result<bool> {
        try_exists(self.path_manager.artifact_path(filename)).await
    }

    async fn create_artifact(&self, filename: &str) -> io::Result<File> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path_manager.artifact_path(filename))
            .await
    }

    async fn remove_artifact(&self, filename: &str) -> io::Result<()> {
        remove_file(self.path_manager.artifact_path(filename)).await
    }

    async fn open_artifact(&self, filename: &str) -> io::Result<Option<File>> {
        open_if_exists(&self.path_manager.artifact_path(filename)).await
    }
}
