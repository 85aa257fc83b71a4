//! # sav-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the SpaceAPI validator.
//! Every setting has a flag and an environment variable; flags win.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sav_api::middleware::rate_limit::RateLimitConfig;
use sav_api::state::{AppConfig, AppState};
use sav_probe::ProbeConfig;

/// SpaceAPI validator service.
///
/// Validates SpaceAPI documents and inspects live SpaceAPI endpoints.
#[derive(Parser, Debug)]
#[command(name = "sav-api", version, about, long_about = None)]
struct Cli {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Address to bind to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    bind_addr: IpAddr,

    /// Origin sent with every endpoint fetch and accepted as a CORS match.
    #[arg(long, env = "VALIDATOR_ORIGIN", default_value = sav_probe::DEFAULT_ORIGIN)]
    origin: String,

    /// Timeout for each fetch attempt, in seconds.
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 10)]
    fetch_timeout_secs: u64,

    /// Maximum number of redirects followed per fetch attempt.
    #[arg(long, env = "MAX_REDIRECTS", default_value_t = 10)]
    max_redirects: usize,

    /// PEM root certificate trusted by strict fetches, in addition to the
    /// web PKI roots. Repeat the flag or comma-separate paths.
    #[arg(long = "extra-root-cert", env = "EXTRA_ROOT_CERTS", value_delimiter = ',')]
    extra_root_certs: Vec<PathBuf>,

    /// Sustained URL validation rate, in requests per second.
    #[arg(long, env = "RATE_LIMIT_PER_SEC", default_value_t = 10.0)]
    rate_limit_per_sec: f64,

    /// URL validation burst size.
    #[arg(long, env = "RATE_LIMIT_BURST", default_value_t = 25)]
    rate_limit_burst: u32,

    /// Emit logs as JSON lines.
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Cli {
    fn app_config(&self) -> Result<AppConfig, Box<dyn std::error::Error>> {
        let mut probe = ProbeConfig {
            origin: self.origin.clone(),
            attempt_timeout: Duration::from_secs(self.fetch_timeout_secs),
            max_redirects: self.max_redirects,
            ..ProbeConfig::default()
        };
        for path in &self.extra_root_certs {
            let pem = std::fs::read(path)
                .map_err(|e| format!("cannot read root certificate {}: {e}", path.display()))?;
            probe.trust_root_pem(&pem)?;
        }
        Ok(AppConfig {
            bind_addr: self.bind_addr,
            port: self.port,
            probe,
            rate_limit: RateLimitConfig {
                per_second: self.rate_limit_per_sec,
                burst: self.rate_limit_burst,
            },
        })
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = cli.app_config()?;
    let addr = config.socket_addr();

    let state = AppState::with_config(config).map_err(|e| {
        tracing::error!("Startup failed: {e}");
        e
    })?;
    let app = sav_api::app(state);

    tracing::info!("SpaceAPI validator listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
