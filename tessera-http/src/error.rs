//! Error types for the HTTP adapters.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tessera_model::MarshalError;
use thiserror::Error;

pub type HttpResult<T> = Result<T, HttpError>;

/// Failure reported by an [`UploadService`](crate::upload::UploadService).
#[derive(Debug, Error)]
pub enum UploadError {
    /// The service refused the upload; reported to the client as a bad request.
    #[error("{0}")]
    Rejected(String),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("multipart error: {message}")]
    Multipart { status: StatusCode, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Multipart { status, .. } => *status,
            Self::Upload(UploadError::Rejected(_)) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Config(_) | Self::Io(_) | Self::Upload(_) | Self::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<MultipartError> for HttpError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<MultipartRejection> for HttpError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::Multipart {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
