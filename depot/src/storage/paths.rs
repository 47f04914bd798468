// PathManager maps upload ids, chunk offsets and filenames to paths.
//
// The path layout in the storage backend is as follows:
//
//	<root>
//	├── uploads
//	├── chunks
//	│   └── <upload_id>
//	│       └── <start>.part
//	└── completed
//	    └── <filename>
//
// `chunks` is the staging area: one directory per in-flight upload and one file per
// staged chunk, named by its start offset. `completed` holds finished artifacts named
// by their original filename. `uploads` is reserved and currently left empty.

use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct PathManager {
    root_path: PathBuf,
}

impl PathManager {
    pub fn new(root: impl AsRef<Path>) -> Self {
        PathManager {
            root_path: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the reserved uploads area, (e.g. `<root>/uploads`).
    pub fn uploads_path(&self) -> PathBuf {
        self.root_path.join("uploads")
    }

    /// Returns the staging area, (e.g. `<root>/chunks`).
    pub fn chunks_path(&self) -> PathBuf {
        self.root_path.join("chunks")
    }

    /// Returns the staging directory of one upload, (e.g. `<root>/chunks/<upload_id>`).
    pub fn upload_chunks_path(&self, upload_id: &str) -> PathBuf {
        self.chunks_path().join(upload_id)
    }

    /// Returns the staged file of one chunk, (e.g. `<root>/chunks/<upload_id>/<start>.part`).
    pub fn chunk_path(&self, upload_id: &str, start: u32) -> PathBuf {
        self.upload_chunks_path(upload_id)
            .join(format!("{start}.part"))
    }

    /// Returns the completed area, (e.g. `<root>/completed`).
    pub fn completed_path(&self) -> PathBuf {
        self.root_path.join("completed")
    }

    /// Returns a finished artifact, (e.g. `<root>/completed/<filename>`).
    pub fn artifact_path(&self, filename: &str) -> PathBuf {
        self.completed_path().join(filename)
    }

    pub fn areas(&self) -> [PathBuf; 3] {
        [self.uploads_path(), self.chunks_path(), self.completed_path()]
    }
}
