// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Gateway-level configuration.
//!
//! [`GatewayConfig`] is the single entry point for tuning the gateway at
//! construction time. All fields have sensible defaults so that
//! `GatewayConfig::default()` is always a valid starting point, matching the
//! values in [`crate::config_loader`]'s environment-variable table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticProvider {
    Anthropic,
    Openai,
    Google,
    Xai,
    Mock,
}

/// Top-level configuration for a [`crate::gateway::Gateway`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub bind_addr: String,
    pub log_format: LogFormat,
    pub log_level: String,

    pub critic_provider: CriticProvider,
    pub critic_api_key: Option<String>,
    pub critic_temperature: f64,
    pub critic_enabled: bool,

    pub default_trust_level: u8,
    /// Fraction of the 0-1000 trust scale decayed per day.
    pub trust_decay_rate: f64,

    pub cache_capacity: usize,
    pub cache_ttl_seconds: f64,

    pub request_deadline_ms: u64,
}

impl GatewayConfig {
    /// Absolute default trust score implied by `default_trust_level`'s band
    /// midpoint, used to seed [`crate::trust::TrustRegistry`].
    pub fn default_trust_score(&self) -> u32 {
        match self.default_trust_level {
            0 => 100,
            1 => 300,
            2 => 500,
            3 => 700,
            _ => 900,
        }
    }

    /// Daily decay amount in absolute score units.
    pub fn daily_decay_score(&self) -> u32 {
        (self.trust_decay_rate * 1000.0).round() as u32
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            log_format: LogFormat::Json,
            log_level: "info".to_string(),
            critic_provider: CriticProvider::Mock,
            critic_api_key: None,
            critic_temperature: 0.3,
            critic_enabled: true,
            default_trust_level: 1,
            trust_decay_rate: 0.01,
            cache_capacity: 10_000,
            cache_ttl_seconds: 300.0,
            request_deadline_ms: 3_000,
        }
    }
}
