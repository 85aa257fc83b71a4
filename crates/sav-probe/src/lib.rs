//! # sav-probe: Endpoint Probing
//!
//! Fetches a SpaceAPI endpoint the way a browser-based consumer would and
//! records what the exchange revealed about it:
//!
//! - **Fetch** ([`Probe::fetch`]): GET with the validator's `Origin`, under a
//!   verify-then-fallback TLS policy, following redirects and noting whether
//!   any of them moved the request onto HTTPS.
//! - **Inspect** ([`inspect`]): CORS exposure and content-type correctness,
//!   derived from the response headers alone.
//!
//! Unreachable endpoints are not errors. [`ProbeError`] is reserved for input
//! that never should have reached the network and for client construction.

pub mod config;
pub mod error;
pub mod fetch;
pub mod inspect;

pub use config::{ConfigError, ProbeConfig, DEFAULT_ORIGIN};
pub use error::ProbeError;
pub use fetch::{Completion, FetchOutcome, Probe, TlsAttempt, Transition};
pub use inspect::{inspect, ComplianceSignals};
