use std::collections::{BTreeSet, HashMap};
use std::time::SystemTime;

use tokio::sync::RwLock;

#[derive(Clone, Debug)]
struct TrackedUpload {
    offsets: BTreeSet<u32>,
    last_activity: SystemTime,
}

impl TrackedUpload {
    fn new() -> Self {
        TrackedUpload {
            offsets: BTreeSet::new(),
            last_activity: SystemTime::now(),
        }
    }
}

/// In-memory registry of the chunk start offsets that have been durably staged,
/// keyed by upload id.
///
/// Every method takes the lock only for the map update itself; callers do their
/// filesystem work before or after, never while holding it.
#[derive(Default)]
pub struct ChunkTracker {
    uploads: RwLock<HashMap<String, TrackedUpload>>,
}

impl ChunkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `start` as staged for `upload_id` and bumps its activity time.
    pub async fn mark_uploaded(&self, upload_id: &str, start: u32) {
        let mut uploads = self.uploads.write().await;
        let upload = uploads
            .entry(upload_id.to_string())
            .or_insert_with(TrackedUpload::new);
        upload.offsets.insert(start);
        upload.last_activity = SystemTime::now();
    }

    pub async fn is_uploaded(&self, upload_id: &str, start: u32) -> bool {
        let uploads = self.uploads.read().await;
        uploads
            .get(upload_id)
            .is_some_and(|upload| upload.offsets.contains(&start))
    }

    /// All staged offsets in ascending order; empty for an unknown id.
    pub async fn get_uploaded_chunks(&self, upload_id: &str) -> Vec<u32> {
        let uploads = self.uploads.read().await;
        uploads
            .get(upload_id)
            .map(|upload| upload.offsets.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Drops one offset whose staged file turned out to be missing.
    pub async fn forget(&self, upload_id: &str, start: u32) {
        let mut uploads = self.uploads.write().await;
        if let Some(upload) = uploads.get_mut(upload_id) {
            upload.offsets.remove(&start);
            upload.last_activity = SystemTime::now();
        }
    }

    pub async fn last_activity(&self, upload_id: &str) -> Option<SystemTime> {
        let uploads = self.uploads.read().await;
        uploads.get(upload_id).map(|upload| upload.last_activity)
    }

    pub async fn clear(&self, upload_id: &str) {
        let mut uploads = self.uploads.write().await;
        uploads.remove(upload_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn unknown_upload_has_no_chunks() {
        let tracker = ChunkTracker::new();
        assert!(!tracker.is_uploaded("nope", 0).await);
        assert!(tracker.get_uploaded_chunks("nope").await.is_empty());
        assert!(tracker.last_activity("nope").await.is_none());
        tracker.clear("nope").await;
    }

    #[tokio::test]
    async fn offsets_are_deduplicated_and_sorted() {
        let tracker = ChunkTracker::new();
        for start in [2000, 0, 1000, 0, 2000] {
            tracker.mark_uploaded("u", start).await;
        }
        assert_eq!(tracker.get_uploaded_chunks("u").await, vec![0, 1000, 2000]);
        assert!(tracker.is_uploaded("u", 1000).await);
        assert!(!tracker.is_uploaded("u", 1).await);
    }

    #[tokio::test]
    async fn uploads_are_isolated() {
        let tracker = ChunkTracker::new();
        tracker.mark_uploaded("a", 0).await;
        tracker.mark_uploaded("b", 5).await;
        assert_eq!(tracker.get_uploaded_chunks("a").await, vec![0]);
        assert_eq!(tracker.get_uploaded_chunks("b").await, vec![5]);
    }

    #[tokio::test]
    async fn clear_removes_everything_for_the_id() {
        let tracker = ChunkTracker::new();
        tracker.mark_uploaded("u", 0).await;
        tracker.mark_uploaded("u", 10).await;
        tracker.clear("u").await;
        assert!(tracker.get_uploaded_chunks("u").await.is_empty());
        assert!(tracker.last_activity("u").await.is_none());
        tracker.clear("u").await;
    }

    #[tokio::test]
    async fn forget_drops_a_single_offset() {
        let tracker = ChunkTracker::new();
        tracker.mark_uploaded("u", 0).await;
        tracker.mark_uploaded("u", 10).await;
        tracker.forget("u", 0).await;
        assert_eq!(tracker.get_uploaded_chunks("u").await, vec![10]);
    }

    #[tokio::test]
    async fn activity_time_moves_forward() {
        let tracker = ChunkTracker::new();
        tracker.mark_uploaded("u", 0).await;
        let first = tracker.last_activity("u").await.unwrap();
        tracker.mark_uploaded("u", 1).await;
        let second = tracker.last_activity("u").await.unwrap();
        assert!(second >= first);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_marks() {
        let tracker = Arc::new(ChunkTracker::new());
        let mut handles = vec![];
        for worker in 0..8u32 {
            let tracker = Arc::clone(&tracker);
            handles.push(tokio::spawn(async move {
                for i in 0..100u32 {
                    tracker.mark_uploaded("shared", i * 8 + worker).await;
                    let _ = tracker.is_uploaded("shared", i).await;
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let offsets = tracker.get_uploaded_chunks("shared").await;
        assert_eq!(offsets.len(), 800);
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }
}
