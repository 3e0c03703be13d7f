//! Shared server and upload-service fixtures for HTTP tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tessera_http::{build_router, HttpConfig, UploadError, UploadReader, UploadService};

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
pub async fn spawn_test_server(config: &HttpConfig, service: Arc<dyn UploadService>) -> String {
    let app = build_router(config, service).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

/// Echoes every reader back and remembers where its spool file lived.
#[derive(Default)]
pub struct EchoService {
    pub spooled: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl UploadService for EchoService {
    async fn upload(&self, readers: Vec<UploadReader>) -> Result<Value, UploadError> {
        let mut parts = Vec::new();
        for reader in &readers {
            assert!(reader.path().exists());
            self.spooled.lock().unwrap().push(reader.path().to_path_buf());
            let bytes = reader.read_to_vec().await?;
            parts.push(json!({
                "name": reader.name,
                "fileName": reader.file_name,
                "contentType": reader.content_type,
                "size": reader.size,
                "content": String::from_utf8_lossy(&bytes),
            }));
        }
        Ok(Value::Array(parts))
    }
}

/// Always refuses the upload.
pub struct RejectingService;

#[async_trait]
impl UploadService for RejectingService {
    async fn upload(&self, _readers: Vec<UploadReader>) -> Result<Value, UploadError> {
        Err(UploadError::Rejected("quota exceeded".to_string()))
    }
}

/// Fails with a storage error after seeing the files.
#[derive(Default)]
pub struct BrokenStorage {
    pub spooled: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl UploadService for BrokenStorage {
    async fn upload(&self, readers: Vec<UploadReader>) -> Result<Value, UploadError> {
        for reader in &readers {
            self.spooled.lock().unwrap().push(reader.path().to_path_buf());
        }
        Err(UploadError::Io(std::io::Error::other("disk full")))
    }
}

pub fn config_with_temp_dir(dir: &std::path::Path) -> HttpConfig {
    HttpConfig {
        temp_dir: Some(dir.to_path_buf()),
        ..HttpConfig::default()
    }
}

pub fn dir_is_empty(dir: &std::path::Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}
