//! Error types for the transaction browser.
//!
//! [`FetchFailure`] is what a provider reports when a request is rejected.
//! The cache layer wraps it in [`CoreError::Fetch`] together with the name of
//! the resource that failed, and that is what coordinator callers see.

use std::path::PathBuf;

use thiserror::Error;

/// An underlying request was rejected.  Never retried by the cache layer.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to fetch {resource}: {source}")]
    Fetch {
        resource: &'static str,
        #[source]
        source: FetchFailure,
    },

    /// The sentinel "all employees" id was used where a real id is required.
    #[error("invalid selection: employee id must not be empty")]
    InvalidSelection,
}

impl CoreError {
    pub fn fetch(resource: &'static str, source: FetchFailure) -> Self {
        CoreError::Fetch { resource, source }
    }
}

/// Startup configuration could not be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid fixture {}: {source}", path.display())]
    Fixture {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
