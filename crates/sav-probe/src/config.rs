//! Probe configuration.
//!
//! Defaults match the public validator deployment: requests carry
//! `Origin: https://validator.spaceapi.io`, each TLS attempt is bounded to
//! ten seconds and at most ten redirects are followed. The strict attempt
//! trusts the bundled web PKI roots plus any roots added with
//! [`ProbeConfig::trust_root_pem`].

use std::time::Duration;

use reqwest::header::HeaderValue;
use reqwest::Certificate;

/// Canonical origin of the validator service.
pub const DEFAULT_ORIGIN: &str = "https://validator.spaceapi.io";

/// Default bound on a single fetch attempt, redirects included.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default redirect budget per attempt.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Configuration for [`crate::Probe`].
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Origin sent with every request and accepted as a CORS match.
    pub origin: String,
    /// Upper bound for one attempt (strict or insecure), redirects included.
    pub attempt_timeout: Duration,
    /// Maximum number of redirects followed within one attempt.
    pub max_redirects: usize,
    /// Additional trust anchors for the strict attempt only.
    pub extra_root_certificates: Vec<Certificate>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            extra_root_certificates: Vec::new(),
        }
    }
}

impl ProbeConfig {
    /// Trust the PEM-encoded root certificate during strict attempts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RootCertificate`] if `pem` holds no parseable
    /// certificate.
    pub fn trust_root_pem(&mut self, pem: &[u8]) -> Result<(), ConfigError> {
        let cert = Certificate::from_pem(pem).map_err(ConfigError::RootCertificate)?;
        self.extra_root_certificates.push(cert);
        Ok(())
    }

    /// Check that the configuration can be used to issue requests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the origin cannot be sent as a header
    /// value or the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.origin.is_empty() {
            return Err(ConfigError::InvalidOrigin(self.origin.clone()));
        }
        HeaderValue::from_str(&self.origin)
            .map_err(|_| ConfigError::InvalidOrigin(self.origin.clone()))?;
        if self.attempt_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("origin {0:?} is not a valid header value")]
    InvalidOrigin(String),
    #[error("attempt timeout must be greater than zero")]
    ZeroTimeout,
    #[error("invalid root certificate: {0}")]
    RootCertificate(#[source] reqwest::Error),
}
