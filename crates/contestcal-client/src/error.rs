//! Client error types.

use contestcal_providers::ProviderError;
use contestcal_sources::SourceError;
use contestcal_sync::SyncError;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A secret reference in the config could not be resolved.
    #[error("failed to resolve {field}: {source}")]
    Secret {
        field: &'static str,
        #[source]
        source: crate::secret::SecretError,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A source could not be constructed.
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// True for credential failures, which need `contestcal auth google`.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Provider(e) => e.code().is_auth(),
            Self::Sync(e) => e.is_auth(),
            _ => false,
        }
    }
}
