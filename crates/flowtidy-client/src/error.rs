use thiserror::Error;

/// Errors raised while setting up a [`NifiClient`](crate::NifiClient).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("invalid API root URL `{url}`: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("could not build HTTP client: {0}")]
    Build(String),
}
