use serde::Serialize;

/// Coarse state of an upload as seen by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadStatus {
    Pending {
        message: String,
    },
    Partial {
        received_chunks: Vec<u32>,
        chunk_count: usize,
    },
    Complete {
        filename: String,
    },
}

impl UploadStatus {
    pub fn pending() -> Self {
        UploadStatus::Pending {
            message: "No chunks received yet".to_string(),
        }
    }

    pub fn partial(received_chunks: Vec<u32>) -> Self {
        let chunk_count = received_chunks.len();
        UploadStatus::Partial {
            received_chunks,
            chunk_count,
        }
    }
}

/// Result of ingesting one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Uploaded,
    Duplicate,
}

impl IngestOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            IngestOutcome::Uploaded => "Chunk uploaded",
            IngestOutcome::Duplicate => "Chunk already received",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialized_shapes() {
        assert_eq!(
            serde_json::to_value(UploadStatus::pending()).unwrap(),
            json!({"status": "pending", "message": "No chunks received yet"})
        );
        assert_eq!(
            serde_json::to_value(UploadStatus::partial(vec![0, 1000])).unwrap(),
            json!({"status": "partial", "received_chunks": [0, 1000], "chunk_count": 2})
        );
        assert_eq!(
            serde_json::to_value(UploadStatus::Complete {
                filename: "report.txt".into()
            })
            .unwrap(),
            json!({"status": "complete", "filename": "report.txt"})
        );
    }
}
