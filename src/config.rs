//! Relay configuration parsed from environment variables.
//!
//! All knobs have defaults so the relay starts with an empty environment.
//! Values that are present but malformed are rejected at startup rather than
//! silently replaced by the default.

use std::env::VarError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_STATIC_DIR: &str = "site";
pub const DEFAULT_ACTIVITY: &str = "DOKAPON_KINGDOM";
pub const DEFAULT_CONTROL_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_CLIENT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_CONTROL_TIMEOUT_MS: u64 = 2000;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
    #[error("unsupported control address {0:?} (expected udp://host:port or tcp://host:port)")]
    ControlAddr(String),
}

// =============================================================================
// TYPES
// =============================================================================

/// Where forwarded messages go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlTarget {
    /// No external controller; messages are only logged.
    Log,
    /// One datagram per message.
    Udp(String),
    /// Newline-terminated lines over a persistent stream.
    Tcp(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub bind_addr: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub default_activity: String,
    pub control: ControlTarget,
    pub control_queue_capacity: usize,
    /// Upper bound on one control socket connect plus write.
    pub control_timeout: Duration,
    pub client_queue_capacity: usize,
}

impl RelayConfig {
    /// Build typed relay config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `BIND_ADDR`: default `0.0.0.0`
    /// - `STATIC_DIR`: default `site`
    /// - `DEFAULT_ACTIVITY`: default `DOKAPON_KINGDOM`
    /// - `CONTROL_ADDR`: `udp://host:port` or `tcp://host:port`, log-only when absent
    /// - `CONTROL_QUEUE_CAPACITY`: default 1024
    /// - `CONTROL_TIMEOUT_MS`: default 2000
    /// - `CLIENT_QUEUE_CAPACITY`: default 256
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if any present variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let default_activity = env_string("DEFAULT_ACTIVITY")?.unwrap_or_else(|| DEFAULT_ACTIVITY.to_string());
        if default_activity.trim().is_empty() {
            return Err(ConfigError::Empty { key: "DEFAULT_ACTIVITY" });
        }

        Ok(Self {
            bind_addr: env_string("BIND_ADDR")?.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port: env_parse("PORT", DEFAULT_PORT)?,
            static_dir: env_string("STATIC_DIR")?.map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from),
            default_activity,
            control: parse_control_target(env_string("CONTROL_ADDR")?.as_deref())?,
            control_queue_capacity: env_parse_nonzero("CONTROL_QUEUE_CAPACITY", DEFAULT_CONTROL_QUEUE_CAPACITY)?,
            control_timeout: Duration::from_millis(env_parse_nonzero("CONTROL_TIMEOUT_MS", DEFAULT_CONTROL_TIMEOUT_MS)?),
            client_queue_capacity: env_parse_nonzero("CLIENT_QUEUE_CAPACITY", DEFAULT_CLIENT_QUEUE_CAPACITY)?,
        })
    }

    /// Socket address string passed to the listener.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        // Bare IPv6 literals need brackets before the port.
        if self.bind_addr.contains(':') && !self.bind_addr.starts_with('[') {
            format!("[{}]:{}", self.bind_addr, self.port)
        } else {
            format!("{}:{}", self.bind_addr, self.port)
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            default_activity: DEFAULT_ACTIVITY.to_string(),
            control: ControlTarget::Log,
            control_queue_capacity: DEFAULT_CONTROL_QUEUE_CAPACITY,
            control_timeout: Duration::from_millis(DEFAULT_CONTROL_TIMEOUT_MS),
            client_queue_capacity: DEFAULT_CLIENT_QUEUE_CAPACITY,
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Read a variable, treating only absence as unset.
fn env_string(key: &'static str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => Ok(Some(raw)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(ConfigError::InvalidValue { key, value: raw.to_string_lossy().into_owned() }),
    }
}

fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match env_string(key)? {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

fn env_parse_nonzero<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Default + PartialEq,
{
    let value = env_parse(key, default)?;
    if value == T::default() {
        return Err(ConfigError::InvalidValue { key, value: "0".into() });
    }
    Ok(value)
}

pub(crate) fn parse_control_target(raw: Option<&str>) -> Result<ControlTarget, ConfigError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(ControlTarget::Log);
    };

    let (scheme, addr) = raw
        .split_once("://")
        .ok_or_else(|| ConfigError::ControlAddr(raw.to_string()))?;
    if addr.is_empty() || !addr.contains(':') {
        return Err(ConfigError::ControlAddr(raw.to_string()));
    }

    match scheme {
        "udp" => Ok(ControlTarget::Udp(addr.to_string())),
        "tcp" => Ok(ControlTarget::Tcp(addr.to_string())),
        _ => Err(ConfigError::ControlAddr(raw.to_string())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
