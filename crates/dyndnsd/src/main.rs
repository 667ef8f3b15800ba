// # dyndnsd - Dynamic DNS Daemon
//
// Thin integration shell over dyndns-core. The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging (console mirror + durable log file)
// 3. Wiring the resolver, provider and state store into the engine
// 4. Running the scheduling loop until SIGINT/SIGTERM
//
// All reconciliation logic lives in dyndns-core.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### DNS provider
// - `DYNDNS_PROVIDER_ENDPOINT`: Record-update API base URL
// - `DYNDNS_PROVIDER_API_KEY`: API key
// - `DYNDNS_PROVIDER_API_SECRET`: API secret
//
// ### IP detection
// - `DYNDNS_LOOKUP_ENDPOINT`: Public-IP detection URL
// - `DYNDNS_LOOKUP_API_KEY`: Detection-service API key
//
// ### Records
// - `DYNDNS_DOMAIN`: Parent domain
// - `DYNDNS_SUBDOMAINS`: Comma-separated labels; an empty label is the apex
// - `DYNDNS_DOMAINS`: Alternative flat list of apex domains (overrides the
//   two variables above when set)
//
// ### Files and scheduling
// - `DYNDNS_STATE_FILE`: Path of the last-applied-IP file
// - `DYNDNS_LOG_FILE`: Path of the append-only log file
// - `DYNDNS_CHECK_INTERVAL_SECS`: Seconds between checks
// - `DYNDNS_LOG_LEVEL`: trace|debug|info|warn|error
//
// Every value has a default, including placeholder credentials that are
// usable for local runs and rejected by the provider at the first real
// update attempt.
//
// ## Example
//
// ```bash
// export DYNDNS_PROVIDER_ENDPOINT=https://api.dnsprovider.example/v1
// export DYNDNS_PROVIDER_API_KEY=pk_...
// export DYNDNS_PROVIDER_API_SECRET=sk_...
// export DYNDNS_LOOKUP_ENDPOINT=https://api.dnsprovider.example/v1/getip
// export DYNDNS_DOMAIN=example.com
// export DYNDNS_SUBDOMAINS=,www
//
// dyndnsd
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

use dyndns_core::config::{ReconcilerConfig, RecordsConfig};
use dyndns_core::{FileIpStore, ReconcileEngine};
use dyndns_ip_http::HttpIpResolver;
use dyndns_provider_http::HttpDnsProvider;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    provider_endpoint: String,
    provider_api_key: String,
    provider_api_secret: String,
    lookup_endpoint: String,
    lookup_api_key: String,
    records: RecordsConfig,
    state_file: String,
    log_file: String,
    check_interval_secs: u64,
    log_level: String,
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment variables with documented
    /// defaults.
    fn from_env() -> Self {
        let records = match env::var("DYNDNS_DOMAINS") {
            Ok(domains) if !domains.trim().is_empty() => RecordsConfig::Domains(
                domains
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            _ => RecordsConfig::DomainWithSubdomains {
                domain: env_or("DYNDNS_DOMAIN", "yourdomain.example"),
                // An unset list means "apex only"; empty labels are kept so
                // `,www` yields the apex plus www.
                subdomains: match env::var("DYNDNS_SUBDOMAINS") {
                    Ok(labels) => labels.split(',').map(|s| s.trim().to_string()).collect(),
                    Err(_) => vec![String::new()],
                },
            },
        };

        Self {
            provider_endpoint: env_or(
                "DYNDNS_PROVIDER_ENDPOINT",
                "https://api.dnsprovider.example/v1",
            ),
            provider_api_key: env_or("DYNDNS_PROVIDER_API_KEY", "your-dns-provider-api-key"),
            provider_api_secret: env_or(
                "DYNDNS_PROVIDER_API_SECRET",
                "your-dns-provider-secret-key",
            ),
            lookup_endpoint: env_or(
                "DYNDNS_LOOKUP_ENDPOINT",
                "https://api.dnsprovider.example/v1/getip",
            ),
            lookup_api_key: env_or("DYNDNS_LOOKUP_API_KEY", "your-ddns-provider-api-key"),
            records,
            state_file: env_or("DYNDNS_STATE_FILE", "./last-ip.json"),
            log_file: env_or("DYNDNS_LOG_FILE", "./dyndnsd.log"),
            check_interval_secs: env::var("DYNDNS_CHECK_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(600),
            log_level: env_or("DYNDNS_LOG_LEVEL", "info"),
        }
    }

    /// Validate the configuration.
    ///
    /// Placeholder credentials deliberately pass validation: they let a
    /// local run start up and fail loudly at the first update attempt.
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("DYNDNS_PROVIDER_ENDPOINT", &self.provider_endpoint),
            ("DYNDNS_LOOKUP_ENDPOINT", &self.lookup_endpoint),
        ] {
            if !value.starts_with("https://") && !value.starts_with("http://") {
                anyhow::bail!("{} must be an http(s) URL. Got: {}", name, value);
            }
        }

        if self.provider_api_key.is_empty() || self.provider_api_secret.is_empty() {
            anyhow::bail!("provider credentials cannot be empty");
        }

        if !(10..=86400).contains(&self.check_interval_secs) {
            anyhow::bail!(
                "DYNDNS_CHECK_INTERVAL_SECS must be between 10 and 86400 seconds. Got: {}",
                self.check_interval_secs
            );
        }

        if self.state_file.is_empty() {
            anyhow::bail!("DYNDNS_STATE_FILE cannot be empty");
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DYNDNS_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        // Record-shape validation (non-empty, no blank domains) lives in
        // the core config types.
        self.records
            .validate()
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;

        Ok(())
    }

    fn level_filter(&self) -> LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "info" => LevelFilter::INFO,
            "warn" => LevelFilter::WARN,
            "error" => LevelFilter::ERROR,
            _ => LevelFilter::INFO,
        }
    }
}

/// Initialize tracing with a console layer and, when the log file can be
/// opened, a durable append-only file layer.
///
/// A file that cannot be opened is reported on stderr and logging continues
/// console-only; the log sink must never take the daemon down.
fn init_logging(config: &Config) {
    let file_layer = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
    {
        Ok(file) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        ),
        Err(e) => {
            eprintln!(
                "failed to open log file {}: {}; continuing with console logging only",
                config.log_file, e
            );
            None
        }
    };

    tracing_subscriber::registry()
        .with(config.level_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .init();
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("configuration error: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    init_logging(&config);

    info!("starting dyndnsd");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("daemon error: {}", e);
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Wire the collaborators into the engine and run it to completion.
async fn run_daemon(config: Config) -> Result<()> {
    let resolver =
        HttpIpResolver::new(config.lookup_endpoint.as_str(), config.lookup_api_key.as_str())?;
    let provider = HttpDnsProvider::new(
        config.provider_endpoint.as_str(),
        config.provider_api_key.as_str(),
        config.provider_api_secret.as_str(),
    )?;
    let store = FileIpStore::new(&config.state_file).await?;

    let engine_config = ReconcilerConfig::new(config.records.clone())
        .with_poll_interval_secs(config.check_interval_secs);

    let engine = ReconcileEngine::new(
        Box::new(resolver),
        Box::new(provider),
        Box::new(store),
        engine_config,
    )?;

    for target in engine.targets() {
        info!("managing record: {}", target.fqdn());
    }
    info!(
        "state file: {}, check interval: {}s",
        config.state_file, config.check_interval_secs
    );

    // Runs one cycle immediately, then one per interval, until a shutdown
    // signal arrives; an in-flight cycle finishes before exit.
    engine.run().await?;

    info!("dyndnsd stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            provider_endpoint: "https://api.example.test/v1".to_string(),
            provider_api_key: "key".to_string(),
            provider_api_secret: "secret".to_string(),
            lookup_endpoint: "https://api.example.test/v1/getip".to_string(),
            lookup_api_key: "lookup-key".to_string(),
            records: RecordsConfig::DomainWithSubdomains {
                domain: "example.com".to_string(),
                subdomains: vec![String::new(), "www".to_string()],
            },
            state_file: "./last-ip.json".to_string(),
            log_file: "./dyndnsd.log".to_string(),
            check_interval_secs: 600,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let mut config = base_config();
        config.provider_endpoint = "ftp://api.example.test".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_interval() {
        let mut config = base_config();
        config.check_interval_secs = 5;
        assert!(config.validate().is_err());

        config.check_interval_secs = 100_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = base_config();
        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_record_set() {
        let mut config = base_config();
        config.records = RecordsConfig::Domains(vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn placeholder_credentials_are_accepted() {
        let mut config = base_config();
        config.provider_api_key = "your-dns-provider-api-key".to_string();
        config.provider_api_secret = "your-dns-provider-secret-key".to_string();
        assert!(config.validate().is_ok());
    }
}
