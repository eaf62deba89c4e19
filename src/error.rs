//! Custom error types for milestone releases.

use std::path::PathBuf;

use thiserror::Error;

/// Substring the API places in a conflict body when a release tag is taken.
pub const ALREADY_EXISTS_CODE: &str = "already_exists";

/// Main error type for milestone release operations.
#[derive(Error, Debug)]
pub enum ReleaseError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Credentials are not injected: {0}")]
    MissingCredentials(String),

    // Network/API errors
    #[error("Network request for '{method} {url}' failed: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },

    #[error("Reading response body for '{method} {url}' (status {status}) failed: {message}")]
    ResponseBody {
        status: u16,
        method: String,
        url: String,
        message: String,
    },

    #[error(
        "Status code {status} for '{method} {url}' is not one of the valid status codes {accepted:?} for this request. Body: {body}"
    )]
    ApiStatus {
        status: u16,
        method: String,
        url: String,
        accepted: Vec<u16>,
        body: String,
    },

    #[error("Deserializing response for '{method} {url}' failed: {source}. Body: {body}")]
    Decode {
        method: String,
        url: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No milestone with title {0} could be found")]
    MilestoneNotFound(String),

    // Local asset errors
    #[error("Failed to read asset {path}: {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to archive asset {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    // Parsing errors - automatic conversions via #[from]
    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParseError(#[from] serde_yaml::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using ReleaseError
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a local I/O error for an asset path
    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// Connection level failures are the only ones worth retrying; a
    /// response with an unexpected status is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// True when the API rejected a create call because the resource
    /// (typically a release tag) already exists.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::ApiStatus { body, .. } if body.contains(ALREADY_EXISTS_CODE)
        )
    }
}
