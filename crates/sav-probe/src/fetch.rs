//! # Endpoint Fetching
//!
//! Retrieves a caller-supplied URL under a verify-then-fallback TLS policy.
//!
//! ## TLS policy
//!
//! ```text
//! Strict ──status < 400──▶ Reachable { cert_valid: is_https || https_forward }
//!    │  ──status ≥ 400──▶ Unreachable
//!    │
//!    └─transport/TLS failure─▶ Insecure ──status < 400──▶ Reachable { cert_valid: false }
//!                                        ──anything else─▶ Unreachable
//! ```
//!
//! [`TlsAttempt::next`] encodes the table above. `Insecure` never falls back,
//! so at most two attempts are made per fetch.
//!
//! ## Redirects
//!
//! Redirects are followed by hand so the scheme of every hop is visible. As
//! soon as one hop targets `https`, `https_forward` is set and stays set for
//! the rest of the fetch, across both attempts.

use reqwest::header::{HeaderMap, LOCATION, ORIGIN};
use reqwest::{Certificate, Client, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ProbeConfig;
use crate::error::ProbeError;

/// Everything the fetch learned about an endpoint.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Some attempt produced a response with status < 400.
    pub reachable: bool,
    /// The caller-supplied URL uses the `https` scheme.
    pub is_https: bool,
    /// A redirect moved the request onto `https`.
    pub https_forward: bool,
    /// The endpoint was reached with full certificate verification over HTTPS.
    pub cert_valid: bool,
    /// Response headers, present only when reachable.
    pub headers: Option<HeaderMap>,
    /// Response body, present only when reachable.
    pub body: Option<Vec<u8>>,
}

impl FetchOutcome {
    fn unreachable(is_https: bool) -> Self {
        Self {
            is_https,
            ..Self::default()
        }
    }

    /// The fetched body, if one was obtained and it is not empty.
    pub fn document(&self) -> Option<&[u8]> {
        self.body.as_deref().filter(|body| !body.is_empty())
    }
}

// -- TLS state machine --------------------------------------------------------

/// Certificate handling for one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsAttempt {
    /// Full certificate verification.
    Strict,
    /// Certificate verification disabled.
    Insecure,
}

/// Terminal state of a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A response was received; `cert_valid` holds only for a strict HTTPS leg.
    Reachable { cert_valid: bool },
    /// No usable response: an error status, or the final attempt failed.
    Unreachable,
}

/// Result of feeding an attempt's outcome into the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Done(Completion),
    Fallback(TlsAttempt),
}

impl TlsAttempt {
    pub fn verifies_certificates(self) -> bool {
        matches!(self, Self::Strict)
    }

    /// Decide what follows an attempt.
    ///
    /// `status` is `None` when the attempt produced no response (connection,
    /// TLS, redirect or timeout failure). `secure_leg` is true when the URL or
    /// any redirect used `https`.
    pub fn next(self, status: Option<StatusCode>, secure_leg: bool) -> Transition {
        match (self, status) {
            (Self::Strict, Some(status)) if is_success(status) => {
                Transition::Done(Completion::Reachable {
                    cert_valid: secure_leg,
                })
            }
            (Self::Strict, Some(_)) => Transition::Done(Completion::Unreachable),
            (Self::Strict, None) => Transition::Fallback(Self::Insecure),
            (Self::Insecure, Some(status)) if is_success(status) => {
                Transition::Done(Completion::Reachable { cert_valid: false })
            }
            (Self::Insecure, _) => Transition::Done(Completion::Unreachable),
        }
    }
}

fn is_success(status: StatusCode) -> bool {
    status.as_u16() < 400
}

// -- Probe --------------------------------------------------------------------

/// A single response at the end of a redirect chain.
struct Exchange {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

/// Endpoint fetcher.
///
/// Holds one HTTP client per [`TlsAttempt`] so that connections established
/// without verification are never reused by a strict attempt.
#[derive(Debug, Clone)]
pub struct Probe {
    config: ProbeConfig,
    strict: Client,
    insecure: Client,
}

impl Probe {
    /// Build a probe from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Config`] for an unusable configuration and
    /// [`ProbeError::Client`] if the TLS backend cannot be initialised.
    pub fn new(config: ProbeConfig) -> Result<Self, ProbeError> {
        config.validate()?;
        Ok(Self {
            strict: build_client(TlsAttempt::Strict, &config.extra_root_certificates)?,
            insecure: build_client(TlsAttempt::Insecure, &[])?,
            config,
        })
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Canonical origin sent with every request.
    pub fn origin(&self) -> &str {
        &self.config.origin
    }

    /// Parse a caller-supplied target into an absolute `http`/`https` URL.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::InvalidUrl`] if the text is not an absolute URL,
    /// uses another scheme, or has no host.
    pub fn parse_target(raw: &str) -> Result<Url, ProbeError> {
        let invalid = |reason: String| ProbeError::InvalidUrl {
            url: raw.to_string(),
            reason,
        };
        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !is_web_scheme(&url) {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        Ok(url)
    }

    /// Fetch `target` and report what the exchange revealed.
    ///
    /// Network failures never surface as errors; they yield an outcome with
    /// `reachable == false` and neither headers nor body.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Request`] only if the initial request cannot be
    /// constructed.
    pub async fn fetch(&self, target: &Url) -> Result<FetchOutcome, ProbeError> {
        let is_https = target.scheme() == "https";
        let mut https_forward = false;
        let mut attempt = TlsAttempt::Strict;

        loop {
            let exchange = self.attempt(attempt, target, &mut https_forward).await?;
            let status = exchange.as_ref().map(|e| e.status);

            match (attempt.next(status, is_https || https_forward), exchange) {
                (Transition::Done(Completion::Reachable { cert_valid }), Some(exchange)) => {
                    info!(
                        url = %target,
                        ?attempt,
                        status = exchange.status.as_u16(),
                        https_forward,
                        cert_valid,
                        "endpoint reachable"
                    );
                    return Ok(FetchOutcome {
                        reachable: true,
                        is_https,
                        https_forward,
                        cert_valid,
                        headers: Some(exchange.headers),
                        body: Some(exchange.body),
                    });
                }
                (Transition::Fallback(next), _) => {
                    warn!(
                        url = %target,
                        "strict attempt failed, retrying without certificate verification"
                    );
                    attempt = next;
                }
                _ => {
                    info!(url = %target, ?attempt, ?status, "endpoint unreachable");
                    return Ok(FetchOutcome::unreachable(is_https));
                }
            }
        }
    }

    /// Run one attempt, bounded by the configured timeout.
    ///
    /// `Ok(None)` means the attempt produced no response.
    async fn attempt(
        &self,
        attempt: TlsAttempt,
        target: &Url,
        https_forward: &mut bool,
    ) -> Result<Option<Exchange>, ProbeError> {
        let client = match attempt {
            TlsAttempt::Strict => &self.strict,
            TlsAttempt::Insecure => &self.insecure,
        };
        let chain = self.follow(client, target, https_forward);
        match tokio::time::timeout(self.config.attempt_timeout, chain).await {
            Ok(result) => result,
            Err(_) => {
                debug!(url = %target, ?attempt, "attempt timed out");
                Ok(None)
            }
        }
    }

    /// GET `target`, following redirects up to the configured budget.
    async fn follow(
        &self,
        client: &Client,
        target: &Url,
        https_forward: &mut bool,
    ) -> Result<Option<Exchange>, ProbeError> {
        let mut current = target.clone();
        let mut redirects = 0usize;

        loop {
            let sent = client
                .get(current.clone())
                .header(ORIGIN, self.config.origin.as_str())
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(e) if e.is_builder() && redirects == 0 => {
                    return Err(ProbeError::Request {
                        url: current.to_string(),
                        source: e,
                    });
                }
                Err(e) => {
                    debug!(url = %current, error = %e, "request failed");
                    return Ok(None);
                }
            };

            let status = response.status();
            if is_followed_redirect(status) {
                if let Some(location) = response.headers().get(LOCATION) {
                    let next = location
                        .to_str()
                        .ok()
                        .and_then(|loc| current.join(loc).ok())
                        .filter(is_web_scheme);
                    let Some(next) = next else {
                        debug!(url = %current, ?location, "unusable redirect location");
                        return Ok(None);
                    };
                    if redirects >= self.config.max_redirects {
                        debug!(url = %target, redirects, "redirect budget exhausted");
                        return Ok(None);
                    }
                    redirects += 1;
                    if next.scheme() == "https" {
                        *https_forward = true;
                    }
                    debug!(from = %current, to = %next, "following redirect");
                    current = next;
                    continue;
                }
            }

            let headers = response.headers().clone();
            if !is_success(status) {
                return Ok(Some(Exchange {
                    status,
                    headers,
                    body: Vec::new(),
                }));
            }

            return match response.bytes().await {
                Ok(body) => Ok(Some(Exchange {
                    status,
                    headers,
                    body: body.to_vec(),
                })),
                Err(e) => {
                    debug!(url = %current, error = %e, "failed to read response body");
                    Ok(None)
                }
            };
        }
    }
}

fn build_client(attempt: TlsAttempt, extra_roots: &[Certificate]) -> Result<Client, ProbeError> {
    let mut builder = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .danger_accept_invalid_certs(!attempt.verifies_certificates())
        .user_agent(concat!("sav-probe/", env!("CARGO_PKG_VERSION")));
    if attempt.verifies_certificates() {
        for root in extra_roots {
            builder = builder.add_root_certificate(root.clone());
        }
    }
    builder.build().map_err(ProbeError::Client)
}

fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}
