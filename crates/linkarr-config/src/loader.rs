//! # Design
//!
//! - Read configuration through an injectable lookup so tests never touch
//!   the process environment.
//! - Required values fail fast with the variable name; optional values fall
//!   back to the deployed defaults.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    AppConfig, CompletionStrategy, HttpConfig, QbitConfig, SonarrConfig, WorkflowConfig,
};

/// Prefix shared by every environment variable the service reads.
pub const ENV_PREFIX: &str = "LINKARR_";

const DEFAULT_PORT: u16 = 12345;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_COMPLETION_DELAY_SECS: u64 = 30;
const DEFAULT_COMPLETION_POLL_SECS: u64 = 5;
const DEFAULT_COMPLETION_MAX_ATTEMPTS: u32 = 24;
const DEFAULT_SETTLE_DELAY_SECS: u64 = 5;

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is absent or a value
    /// cannot be parsed.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is absent or a value
    /// cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let sonarr = SonarrConfig {
            base_url: required(&lookup, "LINKARR_SONARR_URL")?,
            api_key: required(&lookup, "LINKARR_SONARR_API_KEY")?,
        };
        let qbit = QbitConfig {
            base_url: required(&lookup, "LINKARR_QBIT_URL")?,
            username: required(&lookup, "LINKARR_QBIT_USERNAME")?,
            password: required(&lookup, "LINKARR_QBIT_PASSWORD")?,
        };
        let download_dir = PathBuf::from(required(&lookup, "LINKARR_DOWNLOAD_DIR")?);

        let bind_addr = match lookup("LINKARR_BIND_ADDR") {
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "LINKARR_BIND_ADDR",
                reason: "not an ip address",
                value: raw,
            })?,
        };
        let port = parse_or(&lookup, "LINKARR_PORT", DEFAULT_PORT, "not a port number")?;

        let completion = completion_strategy(&lookup)?;
        let settle_delay = Duration::from_secs(parse_or(
            &lookup,
            "LINKARR_SETTLE_DELAY_SECS",
            DEFAULT_SETTLE_DELAY_SECS,
            "not a duration in seconds",
        )?);

        let log_level =
            lookup("LINKARR_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            sonarr,
            qbit,
            download_dir,
            http: HttpConfig { bind_addr, port },
            workflow: WorkflowConfig {
                completion,
                settle_delay,
            },
            log_level,
        })
    }
}

fn completion_strategy(
    lookup: &impl Fn(&str) -> Option<String>,
) -> ConfigResult<CompletionStrategy> {
    let strategy = lookup("LINKARR_COMPLETION_STRATEGY").unwrap_or_else(|| "poll".to_string());
    match strategy.as_str() {
        "poll" => Ok(CompletionStrategy::Poll {
            interval: Duration::from_secs(parse_or(
                lookup,
                "LINKARR_COMPLETION_POLL_SECS",
                DEFAULT_COMPLETION_POLL_SECS,
                "not a duration in seconds",
            )?),
            max_attempts: parse_or(
                lookup,
                "LINKARR_COMPLETION_MAX_ATTEMPTS",
                DEFAULT_COMPLETION_MAX_ATTEMPTS,
                "not an attempt count",
            )?,
        }),
        "fixed" => Ok(CompletionStrategy::FixedDelay(Duration::from_secs(
            parse_or(
                lookup,
                "LINKARR_COMPLETION_DELAY_SECS",
                DEFAULT_COMPLETION_DELAY_SECS,
                "not a duration in seconds",
            )?,
        ))),
        _ => Err(ConfigError::InvalidEnv {
            name: "LINKARR_COMPLETION_STRATEGY",
            reason: "expected `poll` or `fixed`",
            value: strategy,
        }),
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> ConfigResult<String> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv { name }),
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    reason: &'static str,
) -> ConfigResult<T> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            name,
            reason,
            value: raw,
        }),
    }
}
