//! # Admission Rate Limiting
//!
//! A single token bucket shared by every caller. URL validation makes the
//! service issue outbound requests on the caller's behalf, so admission to
//! that route is metered process-wide: 10 permits per second sustained with
//! a burst of 25 unless configured otherwise.
//!
//! The limiter is injected through request extensions, so tests can swap in
//! [`RateLimiter::unlimited`] or a tighter bucket without touching routes.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use thiserror::Error;

use crate::error::AppError;

/// Default sustained refill rate, in permits per second.
pub const DEFAULT_PER_SECOND: f64 = 10.0;

/// Default bucket capacity.
pub const DEFAULT_BURST: u32 = 25;

/// Rate limiter configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// Permits added to the bucket per second.
    pub per_second: f64,
    /// Maximum number of permits the bucket holds.
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: DEFAULT_PER_SECOND,
            burst: DEFAULT_BURST,
        }
    }
}

/// Rejected rate limit settings.
#[derive(Error, Debug, PartialEq)]
pub enum RateLimitConfigError {
    #[error("rate limit must be a positive, finite number of permits per second, got {0}")]
    InvalidRate(f64),
    #[error("rate limit burst must be at least 1")]
    ZeroBurst,
}

impl RateLimitConfig {
    /// Check that the bucket can ever admit a request.
    pub fn validate(&self) -> Result<(), RateLimitConfigError> {
        if !self.per_second.is_finite() || self.per_second <= 0.0 {
            return Err(RateLimitConfigError::InvalidRate(self.per_second));
        }
        if self.burst == 0 {
            return Err(RateLimitConfigError::ZeroBurst);
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Shared rate limiter state. Clones share one bucket.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    bucket: Option<Arc<Mutex<Bucket>>>,
}

impl RateLimiter {
    /// Create a limiter whose bucket starts full.
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitConfigError> {
        config.validate()?;
        let bucket = Bucket {
            tokens: f64::from(config.burst),
            last_refill: Instant::now(),
        };
        Ok(Self {
            config,
            bucket: Some(Arc::new(Mutex::new(bucket))),
        })
    }

    /// A limiter that admits everything.
    pub fn unlimited() -> Self {
        Self {
            config: RateLimitConfig::default(),
            bucket: None,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Take one permit if available.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Take one permit as of `now`.
    ///
    /// Refill and take happen under one lock. The token count never exceeds
    /// the burst and never goes negative; `last_refill` never moves backwards
    /// when callers race with slightly older instants.
    fn allow_at(&self, now: Instant) -> bool {
        let Some(bucket) = &self.bucket else {
            return true;
        };
        let mut bucket = bucket.lock();

        if now > bucket.last_refill {
            let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
            bucket.tokens =
                (bucket.tokens + elapsed * self.config.per_second).min(f64::from(self.config.burst));
            bucket.last_refill = now;
        }

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Middleware that admits requests through the shared [`RateLimiter`].
///
/// Runs before the handler, so a denied request never has its body read
/// and never triggers an outbound fetch. Without a limiter in the request
/// extensions every request is admitted.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let limiter = request.extensions().get::<RateLimiter>().cloned();

    if let Some(limiter) = limiter {
        if !limiter.allow() {
            tracing::warn!(path = %request.uri().path(), "request rejected by rate limiter");
            return AppError::RateLimited.into_response();
        }
    }

    next.run(request).await
}
