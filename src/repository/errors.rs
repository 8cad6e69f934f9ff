use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Not authenticated with the search service")]
    Unauthorized,

    #[error("{operation} failed with HTTP status {status}")]
    Status { operation: &'static str, status: u16 },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RepositoryError::DecodeError(err.to_string())
        } else if err.is_timeout() {
            RepositoryError::ConnectionError(format!("Request timed out: {err}"))
        } else if err.is_connect() || err.is_request() {
            RepositoryError::ConnectionError(err.to_string())
        } else if err.is_builder() {
            RepositoryError::ValidationError(format!("Invalid request: {err}"))
        } else {
            RepositoryError::Unexpected(format!("Unexpected HTTP error: {err}"))
        }
    }
}

impl From<serde_html_form::ser::Error> for RepositoryError {
    fn from(err: serde_html_form::ser::Error) -> Self {
        RepositoryError::ValidationError(format!("Query encoding error: {err}"))
    }
}
