use ghfinder_api::GitHubError;
use thiserror::Error;

/// All the ways things can go wrong in ghfinder
///
/// The stores never interpret these; they hand them straight back to whoever
/// called the operation. Views decide what to show.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<GitHubError> for Error {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::NotFound(what) => Error::NotFound(what),
            GitHubError::RateLimitExceeded => Error::RateLimitExceeded,
            GitHubError::RequestFailed { status, body } => Error::ApiError {
                status,
                message: body,
            },
            GitHubError::NetworkError(e) => Error::NetworkError(e),
            GitHubError::ParseError(e) => Error::SerializationError(e),
        }
    }
}

impl Error {
    /// True for a 404 from the directory
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
