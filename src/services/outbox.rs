use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::errors::SubmissionError;
use crate::services::{MutationClient, Record};
use crate::submission::SubmissionPayload;
use crate::utils::{ensure_dir, write_atomic};

const OUTBOX_EXTENSION: &str = "json";
const OUTBOX_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Mutation client that queues payloads as JSON files for later upload.
pub struct OutboxClient {
    dir: PathBuf,
}

impl OutboxClient {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SubmissionError> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Queued payload files, oldest first.
    pub fn pending(&self) -> Result<Vec<PathBuf>, SubmissionError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(OUTBOX_EXTENSION) {
                entries.push(path);
            }
        }
        entries.sort();
        Ok(entries)
    }
}

impl MutationClient for OutboxClient {
    fn create(&mut self, payload: &SubmissionPayload) -> Result<Record, SubmissionError> {
        let record = Record {
            id: Uuid::new_v4(),
            resource: payload.resource.path(),
            created_at: Utc::now(),
        };
        let mut short_id = record.id.simple().to_string();
        short_id.truncate(8);
        let name = format!(
            "{}_{}_{}.{}",
            record.created_at.format(OUTBOX_TIMESTAMP_FORMAT),
            record.resource.replace('/', "-"),
            short_id,
            OUTBOX_EXTENSION
        );
        let document = json!({
            "id": record.id,
            "resource": record.resource,
            "created_at": record.created_at,
            "payload": payload.to_wire(),
            "dropped": payload.dropped,
        });
        let path = self.dir.join(name);
        write_atomic(&path, &serde_json::to_string_pretty(&document)?)?;
        tracing::debug!(path = %path.display(), "payload queued");
        Ok(record)
    }
}
