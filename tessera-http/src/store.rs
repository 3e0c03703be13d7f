//! A directory-backed [`UploadService`] used by the `tessera-http` binary.

use crate::error::UploadError;
use crate::upload::{UploadReader, UploadService};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tessera_model::{marshal, Model, Properties};
use tracing::{info, warn};
use uuid::Uuid;

/// Record of one stored upload, reported back to the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredFile {
    pub id: String,
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: u64,
    pub path: String,
    pub stored_at: Option<NaiveDateTime>,
}

impl Model for StoredFile {
    fn model_name() -> &'static str {
        "stored_file"
    }

    fn properties(props: &mut Properties<Self>) {
        props.id("id", |f| &f.id, |f| &mut f.id);
        props.field("field", |f| &f.field, |f| &mut f.field);
        props
            .field("fileName", |f| &f.file_name, |f| &mut f.file_name)
            .column("file_name");
        props
            .field("contentType", |f| &f.content_type, |f| &mut f.content_type)
            .column("content_type");
        props.field("size", |f| &f.size, |f| &mut f.size);
        props.field("path", |f| &f.path, |f| &mut f.path);
        props
            .field("storedAt", |f| &f.stored_at, |f| &mut f.stored_at)
            .column("stored_at");
    }
}

/// Copies each upload into a directory under a time-ordered UUID name,
/// keeping the client's extension.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn store(&self, reader: &UploadReader) -> Result<StoredFile, UploadError> {
        let id = Uuid::now_v7().to_string();
        let stored_name = match reader.extension() {
            Some(ext) => format!("{id}.{ext}"),
            None => id.clone(),
        };
        let dest = self.root.join(stored_name);
        tokio::fs::copy(reader.path(), &dest).await?;

        Ok(StoredFile {
            id,
            field: reader.name.clone(),
            file_name: reader.file_name.clone(),
            content_type: reader.content_type.clone(),
            size: reader.size,
            path: dest.display().to_string(),
            stored_at: Some(Utc::now().naive_utc()),
        })
    }

    /// Removes files stored earlier in a request that then failed.
    async fn discard(&self, stored: &[StoredFile]) {
        for file in stored {
            if let Err(e) = tokio::fs::remove_file(&file.path).await {
                warn!(path = %file.path, error = %e, "Failed to remove partial upload");
            }
        }
    }
}

#[async_trait]
impl UploadService for DirectoryStore {
    async fn upload(&self, readers: Vec<UploadReader>) -> Result<Value, UploadError> {
        if readers.is_empty() {
            return Err(UploadError::Rejected("no files in request".to_string()));
        }
        tokio::fs::create_dir_all(&self.root).await?;

        let mut stored = Vec::with_capacity(readers.len());
        for reader in &readers {
            match self.store(reader).await {
                Ok(file) => stored.push(file),
                Err(e) => {
                    self.discard(&stored).await;
                    return Err(e);
                }
            }
        }
        info!(files = stored.len(), root = ?self.root, "Stored uploads");
        Ok(Value::Array(marshal::to_json_list(&stored, None)))
    }
}
