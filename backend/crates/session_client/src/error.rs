//! Session Client Errors

use thiserror::Error;

pub type SessionClientResult<T> = Result<T, SessionClientError>;

#[derive(Debug, Error)]
pub enum SessionClientError {
    /// No session is held locally
    #[error("Not signed in")]
    NotAuthenticated,

    /// The server answered with a non-success status
    #[error("Server rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),
}

impl SessionClientError {
    /// True for 401/403 answers
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Rejected { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for SessionClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err)
        }
    }
}
