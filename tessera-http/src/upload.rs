//! Multipart upload adapter.
//!
//! `POST` [`UPLOAD_URI`] spools every file part of the request to a temp
//! file, hands the resulting [`UploadReader`]s to the configured
//! [`UploadService`] in request order and answers with the service's JSON
//! result. Form fields without a file name are skipped. Temp files live only
//! as long as their readers, so they are removed on every path out of the
//! handler, whether the service succeeded or not.

use crate::error::{HttpError, UploadError};
use async_trait::async_trait;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

pub const UPLOAD_URI: &str = "/tessera/upload";

const SPOOL_PREFIX: &str = "tessera-upload-";

/// One uploaded file part, spooled to disk.
#[derive(Debug)]
pub struct UploadReader {
    /// Form field name of the part.
    pub name: String,
    /// File name as sent by the client.
    pub file_name: String,
    pub content_type: Option<String>,
    /// Bytes written to the spool file.
    pub size: u64,
    pub(crate) file: NamedTempFile,
}

impl UploadReader {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn read_to_vec(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.path()).await
    }

    /// Extension of the client file name, without the dot.
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.file_name).extension().and_then(|ext| ext.to_str())
    }
}

/// Consumes uploaded files and reports a JSON result for the client.
#[async_trait]
pub trait UploadService: Send + Sync {
    async fn upload(&self, readers: Vec<UploadReader>) -> Result<Value, UploadError>;
}

#[derive(Clone)]
pub struct UploadState {
    service: Arc<dyn UploadService>,
    temp_dir: Option<PathBuf>,
}

impl UploadState {
    pub fn new(service: Arc<dyn UploadService>, temp_dir: Option<PathBuf>) -> Self {
        Self { service, temp_dir }
    }

    fn spool_file(&self) -> io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SPOOL_PREFIX);
        match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
    }

    /// Streams every file part of `multipart` into its own spool file.
    async fn spool(&self, mut multipart: Multipart) -> Result<Vec<UploadReader>, HttpError> {
        let mut readers = Vec::new();
        while let Some(mut field) = multipart.next_field().await? {
            let Some(file_name) = field.file_name().map(str::to_owned) else {
                debug!(field = field.name().unwrap_or_default(), "Skipping form field");
                continue;
            };
            let name = field.name().unwrap_or_default().to_owned();
            let content_type = field.content_type().map(str::to_owned);

            let file = self.spool_file()?;
            let mut out = tokio::fs::File::from_std(file.reopen()?);
            let mut size = 0u64;
            while let Some(chunk) = field.chunk().await? {
                out.write_all(&chunk).await?;
                size += chunk.len() as u64;
            }
            out.flush().await?;

            debug!(field = %name, file = %file_name, size, "Spooled upload part");
            readers.push(UploadReader {
                name,
                file_name,
                content_type,
                size,
                file,
            });
        }
        Ok(readers)
    }

    async fn process(&self, multipart: Multipart) -> Result<Value, HttpError> {
        let readers = self.spool(multipart).await?;
        let count = readers.len();
        let result = self.service.upload(readers).await?;
        info!(files = count, "Upload handled");
        Ok(result)
    }
}

/// `POST` handler for [`UPLOAD_URI`].
pub async fn upload_handler(
    State(state): State<UploadState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, HttpError> {
    let result = match multipart {
        Ok(multipart) => state.process(multipart).await,
        Err(rejection) => Err(rejection.into()),
    };
    result.map(Json).inspect_err(|e| warn!(error = %e, "Upload request failed"))
}
