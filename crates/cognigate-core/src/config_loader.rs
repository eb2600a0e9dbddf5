// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Configuration loader for [`crate::gateway::Gateway`].
//!
//! Supports two load strategies:
//!
//! 1. **TOML file** — [`load_config`] reads and deserialises a TOML file into
//!    a [`GatewayConfig`].
//! 2. **Environment variables** — [`load_config_from_env`] reads
//!    `COGNIGATE_`-prefixed environment variables.
//!
//! | Variable | Type | Default |
//! |---|---|---|
//! | `COGNIGATE_BIND_ADDR` | string | `0.0.0.0:8080` |
//! | `COGNIGATE_LOG_FORMAT` | `json`\|`pretty` | `json` |
//! | `COGNIGATE_LOG_LEVEL` | tracing filter string | `info` |
//! | `COGNIGATE_CRITIC_PROVIDER` | `anthropic`\|`openai`\|`google`\|`xai`\|`mock` | `mock` |
//! | `COGNIGATE_CRITIC_API_KEY` | string | unset |
//! | `COGNIGATE_CRITIC_TEMPERATURE` | f64 | `0.3` |
//! | `COGNIGATE_CRITIC_ENABLED` | bool | `true` |
//! | `COGNIGATE_DEFAULT_TRUST_LEVEL` | u8 0-4 | `1` |
//! | `COGNIGATE_TRUST_DECAY_RATE` | f64 0-1 | `0.01` |
//! | `COGNIGATE_CACHE_CAPACITY` | usize | `10000` |
//! | `COGNIGATE_CACHE_TTL_SECONDS` | f64 | `300` |
//! | `COGNIGATE_REQUEST_DEADLINE_MS` | u64 | `3000` |

use std::fmt;
use std::fs;

use crate::config::{CriticProvider, GatewayConfig, LogFormat};

#[derive(Debug)]
pub enum ConfigError {
    FileRead { path: String, source: std::io::Error },
    TomlParse { source: toml::de::Error },
    ParseField { field: String, value: String, reason: String },
    InvalidRange { field: String, value: String, reason: String },
    MissingRequired { field: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileRead { path, source } => {
                write!(f, "failed to read config file \"{path}\": {source}")
            }
            ConfigError::TomlParse { source } => write!(f, "failed to parse TOML config: {source}"),
            ConfigError::ParseField { field, value, reason } => {
                write!(f, "field \"{field}\": cannot parse \"{value}\" — {reason}")
            }
            ConfigError::InvalidRange { field, value, reason } => {
                write!(f, "field \"{field}\": value \"{value}\" out of range — {reason}")
            }
            ConfigError::MissingRequired { field } => write!(f, "missing required field \"{field}\""),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileRead { source, .. } => Some(source),
            ConfigError::TomlParse { source } => Some(source),
            _ => None,
        }
    }
}

pub fn load_config(path: &str) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_owned(),
        source,
    })?;

    toml::from_str::<GatewayConfig>(&content).map_err(|source| ConfigError::TomlParse { source })
}

pub fn load_config_from_env() -> Result<GatewayConfig, ConfigError> {
    let defaults = GatewayConfig::default();

    let bind_addr = read_env_string("COGNIGATE_BIND_ADDR", &defaults.bind_addr);

    let log_format = match std::env::var("COGNIGATE_LOG_FORMAT") {
        Ok(val) => match val.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => {
                return Err(ConfigError::ParseField {
                    field: "COGNIGATE_LOG_FORMAT".into(),
                    value: other.into(),
                    reason: "expected one of: json, pretty".into(),
                })
            }
        },
        Err(_) => defaults.log_format,
    };

    let log_level = read_env_string("COGNIGATE_LOG_LEVEL", &defaults.log_level);

    let critic_provider = match std::env::var("COGNIGATE_CRITIC_PROVIDER") {
        Ok(val) => match val.to_ascii_lowercase().as_str() {
            "anthropic" => CriticProvider::Anthropic,
            "openai" => CriticProvider::Openai,
            "google" => CriticProvider::Google,
            "xai" => CriticProvider::Xai,
            "mock" => CriticProvider::Mock,
            other => {
                return Err(ConfigError::ParseField {
                    field: "COGNIGATE_CRITIC_PROVIDER".into(),
                    value: other.into(),
                    reason: "expected one of: anthropic, openai, google, xai, mock".into(),
                })
            }
        },
        Err(_) => defaults.critic_provider,
    };

    let critic_api_key = std::env::var("COGNIGATE_CRITIC_API_KEY").ok();
    if !matches!(critic_provider, CriticProvider::Mock) && critic_api_key.is_none() {
        return Err(ConfigError::MissingRequired {
            field: "COGNIGATE_CRITIC_API_KEY".into(),
        });
    }

    let critic_temperature =
        read_env_f64("COGNIGATE_CRITIC_TEMPERATURE", defaults.critic_temperature)?;
    if !(0.0..=2.0).contains(&critic_temperature) {
        return Err(ConfigError::InvalidRange {
            field: "COGNIGATE_CRITIC_TEMPERATURE".into(),
            value: critic_temperature.to_string(),
            reason: "must be in range 0.0-2.0".into(),
        });
    }

    let critic_enabled = read_env_bool("COGNIGATE_CRITIC_ENABLED", defaults.critic_enabled)?;

    let default_trust_level =
        read_env_u8("COGNIGATE_DEFAULT_TRUST_LEVEL", defaults.default_trust_level)?;
    if default_trust_level > 4 {
        return Err(ConfigError::InvalidRange {
            field: "COGNIGATE_DEFAULT_TRUST_LEVEL".into(),
            value: default_trust_level.to_string(),
            reason: "must be in range 0-4 (matching TrustLevel discriminants)".into(),
        });
    }

    let trust_decay_rate = read_env_f64("COGNIGATE_TRUST_DECAY_RATE", defaults.trust_decay_rate)?;
    if !(0.0..=1.0).contains(&trust_decay_rate) {
        return Err(ConfigError::InvalidRange {
            field: "COGNIGATE_TRUST_DECAY_RATE".into(),
            value: trust_decay_rate.to_string(),
            reason: "must be in range 0.0-1.0".into(),
        });
    }

    let cache_capacity = read_env_usize("COGNIGATE_CACHE_CAPACITY", defaults.cache_capacity)?;
    let cache_ttl_seconds = read_env_f64("COGNIGATE_CACHE_TTL_SECONDS", defaults.cache_ttl_seconds)?;
    let request_deadline_ms =
        read_env_u64("COGNIGATE_REQUEST_DEADLINE_MS", defaults.request_deadline_ms)?;

    Ok(GatewayConfig {
        bind_addr,
        log_format,
        log_level,
        critic_provider,
        critic_api_key,
        critic_temperature,
        critic_enabled,
        default_trust_level,
        trust_decay_rate,
        cache_capacity,
        cache_ttl_seconds,
        request_deadline_ms,
    })
}

fn read_env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_env_u8(key: &str, default: u8) -> Result<u8, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u8>().map_err(|source| ConfigError::ParseField {
            field: key.to_owned(),
            value: val,
            reason: source.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn read_env_f64(key: &str, default: f64) -> Result<f64, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<f64>().map_err(|source| ConfigError::ParseField {
            field: key.to_owned(),
            value: val,
            reason: source.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn read_env_usize(key: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().map_err(|source| ConfigError::ParseField {
            field: key.to_owned(),
            value: val,
            reason: source.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn read_env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u64>().map_err(|source| ConfigError::ParseField {
            field: key.to_owned(),
            value: val,
            reason: source.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn read_env_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(ConfigError::ParseField {
                field: key.to_owned(),
                value: other.to_owned(),
                reason: "expected one of: true/false, 1/0, yes/no, on/off".into(),
            }),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_when_nothing_set() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("COGNIGATE_BIND_ADDR");
        std::env::remove_var("COGNIGATE_CRITIC_PROVIDER");
        let config = load_config_from_env().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert!(matches!(config.critic_provider, CriticProvider::Mock));
    }

    #[test]
    fn non_mock_provider_requires_api_key() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("COGNIGATE_CRITIC_PROVIDER", "anthropic");
        std::env::remove_var("COGNIGATE_CRITIC_API_KEY");
        let result = load_config_from_env();
        assert!(matches!(result, Err(ConfigError::MissingRequired { .. })));
        std::env::remove_var("COGNIGATE_CRITIC_PROVIDER");
    }

    #[test]
    fn invalid_trust_level_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("COGNIGATE_DEFAULT_TRUST_LEVEL", "9");
        let result = load_config_from_env();
        assert!(matches!(result, Err(ConfigError::InvalidRange { .. })));
        std::env::remove_var("COGNIGATE_DEFAULT_TRUST_LEVEL");
    }
}
