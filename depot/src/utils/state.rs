use crate::config::Config;
use crate::domain::ChunkTracker;
use crate::storage::{Storage, driver::filesystem::FilesystemStorage};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// One async read/write lock per upload id.
///
/// Chunk ingests take the shared half and may run side by side. A merge takes the
/// exclusive half, so it never overlaps an ingest of the same upload.
#[derive(Default)]
pub struct UploadLocks {
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

impl UploadLocks {
    async fn entry(&self, upload_id: &str) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(upload_id.to_string()).or_default().clone()
    }

    /// Held while a chunk is staged and recorded.
    pub async fn shared(&self, upload_id: &str) -> OwnedRwLockReadGuard<()> {
        self.entry(upload_id).await.read_owned().await
    }

    /// Held for the whole duration of a merge.
    pub async fn exclusive(&self, upload_id: &str) -> OwnedRwLockWriteGuard<()> {
        self.entry(upload_id).await.write_owned().await
    }

    /// Drops the lock entry once nobody else holds or waits on it.
    pub async fn release(&self, upload_id: &str) {
        let mut locks = self.locks.lock().await;
        if locks
            .get(upload_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(upload_id);
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

pub struct AppState {
    pub tracker: ChunkTracker,
    pub storage: Arc<dyn Storage>,
    pub upload_locks: UploadLocks,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let storage = Arc::new(FilesystemStorage::new(&config.root_dir));
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: Config, storage: Arc<dyn Storage>) -> Self {
        AppState {
            tracker: ChunkTracker::new(),
            storage,
            upload_locks: UploadLocks::default(),
            config: Arc::new(config),
        }
    }
}
