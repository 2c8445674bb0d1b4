use std::path::PathBuf;

use thiserror::Error;

use crate::host::HostError;

/// Fatal conditions that abort an import session.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed ECM input: {reason}")]
    MalformedInput { reason: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("host contract violation: {0}")]
    Host(#[from] HostError),
}

impl ImportError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ImportError::MalformedInput {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::malformed(err.to_string())
    }
}

pub type Result<T, E = ImportError> = std::result::Result<T, E>;
