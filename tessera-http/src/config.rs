//! HTTP adapter configuration, read from a JSON file and overridden by CLI
//! flags in the binary.

use crate::error::HttpError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Serve paths whose suffix names a server-side script (`.jsp`, `.jspx`).
    #[serde(default)]
    pub allow_jsp: bool,
    /// Maximum upload request size, e.g. `"512k"`, `"1m"`, `"2gb"`.
    #[serde(default = "default_upload_max_size")]
    pub upload_max_size: String,
    /// Where the bundled store keeps uploaded files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Where multipart file parts are spooled while a request is handled.
    /// The system temp directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

fn default_upload_max_size() -> String {
    "1m".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            allow_jsp: false,
            upload_max_size: default_upload_max_size(),
            upload_dir: default_upload_dir(),
            temp_dir: None,
        }
    }
}

impl HttpConfig {
    pub fn from_json_str(text: &str) -> Result<Self, HttpError> {
        serde_json::from_str(text).map_err(|e| HttpError::Config(format!("invalid config: {e}")))
    }

    /// Loads configuration from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, HttpError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| HttpError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_json_str(&text)?;
        info!("Loaded HTTP config from {:?}", path);
        Ok(config)
    }

    /// Upload size limit in bytes.
    pub fn upload_limit(&self) -> Result<usize, HttpError> {
        let bytes = parse_byte_size(&self.upload_max_size)?;
        usize::try_from(bytes).map_err(|_| {
            HttpError::Config(format!("upload_max_size too large: {}", self.upload_max_size))
        })
    }
}

/// Parses a human byte size: a whole number with an optional `k`, `m` or
/// `g` unit (powers of 1024) and an optional trailing `b`. Case-insensitive.
pub fn parse_byte_size(text: &str) -> Result<u64, HttpError> {
    let invalid = || HttpError::Config(format!("invalid byte size: {text:?}"));

    let lower = text.trim().to_ascii_lowercase();
    let unit_part = lower.strip_suffix('b').unwrap_or(&lower);
    let (digits, multiplier) = match unit_part.as_bytes().last() {
        Some(b'k') => (&unit_part[..unit_part.len() - 1], 1u64 << 10),
        Some(b'm') => (&unit_part[..unit_part.len() - 1], 1u64 << 20),
        Some(b'g') => (&unit_part[..unit_part.len() - 1], 1u64 << 30),
        _ => (unit_part, 1),
    };

    let digits = digits.trim_end();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(invalid)
}
