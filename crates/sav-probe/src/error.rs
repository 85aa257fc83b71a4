//! Probe errors.
//!
//! Network failures are folded into an unreachable [`crate::FetchOutcome`];
//! only the cases below surface to the caller.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum ProbeError {
    /// The target is not an absolute URL with a host.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The outbound request could not be constructed.
    #[error("failed to build request for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be initialised.
    #[error("failed to initialise HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
