//! Request path screening.

use crate::config::HttpConfig;
use crate::error::HttpError;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

/// Rejects requests for server-side script resources unless they are
/// explicitly allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityHelper {
    allow_jsp: bool,
}

impl SecurityHelper {
    pub fn new(allow_jsp: bool) -> Self {
        Self { allow_jsp }
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(config.allow_jsp)
    }

    pub fn allows_jsp(&self) -> bool {
        self.allow_jsp
    }

    /// Whether a request for `path` may proceed.
    pub fn is_enable(&self, path: &str) -> bool {
        if !self.allow_jsp && is_jsp(path) {
            warn!(path, "Rejected suspected JSP request");
            return false;
        }
        true
    }
}

/// The suffix from the last `.` onwards mentions `jsp`, in any case.
fn is_jsp(path: &str) -> bool {
    path.rfind('.')
        .is_some_and(|dot| path[dot..].to_ascii_lowercase().contains("jsp"))
}

/// Middleware answering `403` for paths the helper rejects.
pub async fn security_guard(
    State(helper): State<SecurityHelper>,
    request: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let path = request.uri().path();
    if !helper.is_enable(path) {
        return Err(HttpError::Forbidden(path.to_string()));
    }
    Ok(next.run(request).await)
}
