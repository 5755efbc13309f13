use thiserror::Error;

/// Network-layer errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// The mempool refused the submission; carries the server's `message`
    /// field (or the HTTP status text when the body is unparseable).
    #[error("submission rejected: {0}")]
    SubmissionRejected(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(e.to_string())
        }
    }
}
