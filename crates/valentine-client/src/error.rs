use thiserror::Error;
use uuid::Uuid;

/// Failure of a Record Store call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request {0} not found")]
    NotFound(Uuid),

    /// The store answered but refused the operation.
    #[error("store rejected the call ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("malformed store response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
}
