use ivr_relay_core::RelayPolicy;
use std::net::SocketAddr;
use std::str::FromStr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Where the call platform should open the audio stream.
    pub audio_stream_host: String,
    /// Base URL the call platform posts call events back to.
    pub webhook_host: String,
    pub stream_content_type: String,
    pub log_level: Level,
    pub outbound_queue_capacity: usize,
    pub relay_policy: RelayPolicy,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address: SocketAddr = parse_var("BIND_ADDRESS", "0.0.0.0:5001")?;

        let audio_stream_host = required_var("AUDIO_STREAM_HOST")?;
        let webhook_host = required_var("WEBHOOK_HOST")?;

        let stream_content_type = std::env::var("STREAM_CONTENT_TYPE")
            .unwrap_or_else(|_| "audio/mulaw;rate=8000".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let outbound_queue_capacity: usize = parse_var("OUTBOUND_QUEUE_CAPACITY", "64")?;
        if outbound_queue_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "OUTBOUND_QUEUE_CAPACITY".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let defaults = RelayPolicy::default();
        let relay_policy = RelayPolicy {
            audio_echo_id: std::env::var("AUDIO_ECHO_ID").unwrap_or(defaults.audio_echo_id),
            dtmf_echo_id: std::env::var("DTMF_ECHO_ID").unwrap_or(defaults.dtmf_echo_id),
            dtmf_press_duration_ms: parse_var(
                "DTMF_PRESS_DURATION_MS",
                &defaults.dtmf_press_duration_ms.to_string(),
            )?,
            dtmf_break_duration_ms: parse_var(
                "DTMF_BREAK_DURATION_MS",
                &defaults.dtmf_break_duration_ms.to_string(),
            )?,
        };

        Ok(Self {
            bind_address,
            audio_stream_host,
            webhook_host,
            stream_content_type,
            log_level,
            outbound_queue_capacity,
            relay_policy,
        })
    }

    /// The URL the call platform posts post-call events to.
    pub fn callback_url(&self) -> String {
        format!("{}/callback", self.webhook_host.trim_end_matches('/'))
    }
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name.to_string())),
    }
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}
