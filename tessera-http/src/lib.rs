//! HTTP adapters for Tessera models.

pub mod config;
pub mod error;
pub mod security;
pub mod store;
pub mod upload;

pub use config::{parse_byte_size, HttpConfig};
pub use error::{ErrorBody, HttpError, HttpResult, UploadError};
pub use security::SecurityHelper;
pub use store::{DirectoryStore, StoredFile};
pub use upload::{UploadReader, UploadService, UploadState, UPLOAD_URI};

use axum::extract::DefaultBodyLimit;
use axum::http::Uri;
use axum::routing::post;
use axum::{middleware, Router};
use std::sync::Arc;
use tracing::debug;

async fn not_found(uri: Uri) -> HttpError {
    HttpError::NotFound(uri.path().to_string())
}

/// Build the HTTP router: the upload route behind the security guard.
///
/// The body limit is parsed from `config` here, once, so a bad size fails
/// at startup rather than on the first request.
pub fn build_router(config: &HttpConfig, service: Arc<dyn UploadService>) -> HttpResult<Router> {
    let limit = config.upload_limit()?;
    debug!(limit, allow_jsp = config.allow_jsp, "Building router");

    let uploads = UploadState::new(service, config.temp_dir.clone());
    let security = SecurityHelper::from_config(config);

    Ok(Router::new()
        .route(UPLOAD_URI, post(upload::upload_handler))
        .layer(DefaultBodyLimit::max(limit))
        .fallback(not_found)
        .with_state(uploads)
        .layer(middleware::from_fn_with_state(security, security::security_guard)))
}
