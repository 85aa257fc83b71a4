//! # Application State
//!
//! Shared state for the Axum application: the compiled schema validator,
//! the endpoint probe with its two HTTP clients, and the admission limiter.
//! Everything here is built once at startup and cloned cheaply per request;
//! the token bucket inside [`RateLimiter`] is the only mutable piece.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use sav_probe::{Probe, ProbeConfig, ProbeError};
use sav_schema::{DocumentValidator, SchemaLoadError, SpaceApiValidator};
use thiserror::Error;

use crate::middleware::rate_limit::{RateLimitConfig, RateLimitConfigError, RateLimiter};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address to bind the HTTP server to.
    pub bind_addr: IpAddr,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Outbound fetch settings.
    pub probe: ProbeConfig,
    /// Admission limiter settings for URL validation.
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            probe: ProbeConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

/// State could not be assembled at startup.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Schema(#[from] SchemaLoadError),
    #[error("failed to build endpoint probe: {0}")]
    Probe(#[from] ProbeError),
    #[error("invalid rate limit configuration: {0}")]
    RateLimit(#[from] RateLimitConfigError),
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub validator: Arc<dyn DocumentValidator>,
    pub probe: Probe,
    pub limiter: RateLimiter,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("validator", &"<dyn DocumentValidator>")
            .field("probe", &self.probe)
            .field("limiter", &self.limiter)
            .finish()
    }
}

impl AppState {
    /// Create application state with the default configuration.
    pub fn new() -> Result<Self, StartupError> {
        Self::with_config(AppConfig::default())
    }

    /// Create application state from the given configuration.
    ///
    /// # Errors
    ///
    /// Fails if an embedded schema does not compile, the probe configuration
    /// is unusable, or the rate limit settings can never admit a request.
    pub fn with_config(config: AppConfig) -> Result<Self, StartupError> {
        let validator = SpaceApiValidator::new()?;
        tracing::debug!(versions = ?validator.versions(), "compiled SpaceAPI schemas");

        let probe = Probe::new(config.probe.clone())?;
        let limiter = RateLimiter::new(config.rate_limit)?;

        Ok(Self {
            config: Arc::new(config),
            validator: Arc::new(validator),
            probe,
            limiter,
        })
    }

    /// Replace the admission limiter.
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Replace the schema validator.
    pub fn with_validator(mut self, validator: Arc<dyn DocumentValidator>) -> Self {
        self.validator = validator;
        self
    }
}
