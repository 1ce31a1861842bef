//! Error types for contest sources.

use thiserror::Error;

/// A failure that loses a source's whole contribution for this run.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request could not be sent or the body could not be read.
    #[error("[{source_name}] request failed: {message}")]
    Network {
        source_name: String,
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("[{source_name}] HTTP {status} from {url}")]
    Status {
        source_name: String,
        status: u16,
        url: String,
    },

    /// The body did not have the expected shape.
    #[error("[{source_name}] invalid response: {message}")]
    InvalidResponse {
        source_name: String,
        message: String,
    },

    /// The source was constructed with an unusable configuration.
    #[error("[{source_name}] configuration error: {message}")]
    Configuration {
        source_name: String,
        message: String,
    },
}

impl SourceError {
    pub fn network(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn configuration(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Returns the name of the source that failed.
    pub fn source_name(&self) -> &str {
        match self {
            Self::Network { source_name, .. }
            | Self::Status { source_name, .. }
            | Self::InvalidResponse { source_name, .. }
            | Self::Configuration { source_name, .. } => source_name,
        }
    }
}

/// A specialized Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;
