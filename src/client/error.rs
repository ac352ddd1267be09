use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered and refused the credentials.
    #[error("{0}")]
    Unauthenticated(String),

    /// No HTTP response at all: refused connection, DNS failure, timeout.
    #[error("server unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// True when the server itself rejected the request (401 or another 4xx).
    pub fn is_rejection(&self) -> bool {
        match self {
            ClientError::Unauthenticated(_) => true,
            ClientError::Server { status, .. } => (400..500).contains(status),
            ClientError::Unreachable(_) | ClientError::Decode(_) => false,
        }
    }
}
