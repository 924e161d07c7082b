use std::path::PathBuf;

use thiserror::Error;

/// Boxed error produced by a [`Transport`](crate::screening::Transport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum ScreeningError {
    #[error("failed to read denylist {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read screening response body: {0}")]
    ReadBody(#[source] BoxError),

    #[error("malformed denylist {path}: {source}")]
    DecodeDenylist {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed screening response: {0}")]
    DecodeVerdict(#[source] serde_json::Error),

    #[error("screening endpoint unreachable after {attempts} attempts: {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: BoxError,
    },

    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: &'static str },
}

impl ScreeningError {
    /// True for failures to read a file or a response body.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::ReadFile { .. } | Self::ReadBody(_))
    }

    /// True for structurally invalid denylists or verdict bodies.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::DecodeDenylist { .. } | Self::DecodeVerdict(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScreeningError>;
