//! Runtime configuration
//!
//! Everything has a default. `from_env` overrides from `PUPPET_*` variables;
//! durations use humantime syntax (`250ms`, `30s`, `1m`).

use std::str::FromStr;
use std::time::Duration;

use puppet_core::{ClientId, PuppetError, PuppetResult};

use crate::{DirectorConfig, DriverConfig};

pub const ENV_BACKEND_URL: &str = "PUPPET_BACKEND_URL";
pub const ENV_CLIENT_ID: &str = "PUPPET_CLIENT_ID";
pub const ENV_IDLE_TIMEOUT: &str = "PUPPET_IDLE_TIMEOUT";
pub const ENV_POLL_INTERVAL: &str = "PUPPET_POLL_INTERVAL";
pub const ENV_RENDER_INTERVAL: &str = "PUPPET_RENDER_INTERVAL";
pub const ENV_LIBRARY_REFRESH: &str = "PUPPET_LIBRARY_REFRESH";
pub const ENV_SETTINGS_INTERVAL: &str = "PUPPET_SETTINGS_INTERVAL";
pub const ENV_QUEUE_CAPACITY: &str = "PUPPET_QUEUE_CAPACITY";
pub const ENV_MOUTH_PARAM: &str = "PUPPET_MOUTH_PARAM";
pub const ENV_LIP_SYNC_SENSITIVITY: &str = "PUPPET_LIP_SYNC_SENSITIVITY";
pub const ENV_LOG_JSON: &str = "PUPPET_LOG_JSON";

/// Full runtime configuration
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub backend_url: String,
    pub client_id: ClientId,
    pub director: DirectorConfig,
    pub driver: DriverConfig,
    /// JSON log lines instead of human-readable ones
    pub log_json: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            backend_url: "http://localhost:8000".to_string(),
            client_id: ClientId::generate(),
            director: DirectorConfig::default(),
            driver: DriverConfig::default(),
            log_json: false,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> PuppetResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by `lookup`; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PuppetResult<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = RuntimeConfig::default();

        if let Some(url) = get(ENV_BACKEND_URL) {
            config.backend_url = url.trim().to_string();
        }
        if let Some(id) = get(ENV_CLIENT_ID) {
            config.client_id = ClientId::new(id.trim());
        }
        if let Some(v) = get(ENV_IDLE_TIMEOUT) {
            config.director.idle_timeout = parse_duration(ENV_IDLE_TIMEOUT, &v)?;
        }
        if let Some(v) = get(ENV_POLL_INTERVAL) {
            config.driver.poll_interval = parse_interval(ENV_POLL_INTERVAL, &v)?;
        }
        if let Some(v) = get(ENV_RENDER_INTERVAL) {
            config.driver.render_interval = parse_interval(ENV_RENDER_INTERVAL, &v)?;
        }
        if let Some(v) = get(ENV_LIBRARY_REFRESH) {
            config.driver.library_refresh = parse_interval(ENV_LIBRARY_REFRESH, &v)?;
        }
        if let Some(v) = get(ENV_SETTINGS_INTERVAL) {
            config.driver.settings_interval = parse_interval(ENV_SETTINGS_INTERVAL, &v)?;
        }
        if let Some(v) = get(ENV_QUEUE_CAPACITY) {
            config.director.queue_capacity = parse_value(ENV_QUEUE_CAPACITY, &v)?;
        }
        if let Some(v) = get(ENV_MOUTH_PARAM) {
            config.director.animator.mouth_param = v.trim().to_string();
        }
        if let Some(v) = get(ENV_LIP_SYNC_SENSITIVITY) {
            let sensitivity: f32 = parse_value(ENV_LIP_SYNC_SENSITIVITY, &v)?;
            if !(sensitivity.is_finite() && sensitivity > 0.0) {
                return Err(PuppetError::Config(format!(
                    "{ENV_LIP_SYNC_SENSITIVITY} must be positive, got {v}"
                )));
            }
            config.director.lip_sync_sensitivity = sensitivity;
        }
        if let Some(v) = get(ENV_LOG_JSON) {
            config.log_json = parse_flag(ENV_LOG_JSON, &v)?;
        }

        Ok(config)
    }
}

fn parse_duration(name: &str, value: &str) -> PuppetResult<Duration> {
    humantime::parse_duration(value.trim())
        .map_err(|e| PuppetError::Config(format!("{name}={value:?}: {e}")))
}

/// Like `parse_duration` but zero is rejected (tokio intervals panic on it)
fn parse_interval(name: &str, value: &str) -> PuppetResult<Duration> {
    let d = parse_duration(name, value)?;
    if d.is_zero() {
        return Err(PuppetError::Config(format!("{name} must be non-zero")));
    }
    Ok(d)
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> PuppetResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| PuppetError::Config(format!("{name}={value:?}: {e}")))
}

fn parse_flag(name: &str, value: &str) -> PuppetResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(PuppetError::Config(format!("{name}={other:?}: expected a boolean"))),
    }
}
