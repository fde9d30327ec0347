// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the fetch gate.
//!
//! Defaults give an open allowlist, strict suffix matching and a one second
//! politeness interval per domain. [`Config::from_env`] layers environment
//! overrides on top of the defaults.

use crate::allowlist::MatchMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration for the fetch gate and its service shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 127.0.0.1:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Politeness delay configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Domain allowlist configuration
    #[serde(default)]
    pub allowlist: AllowlistConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Per-domain politeness delay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum spacing between two admissions to one domain, in milliseconds (default: 1000)
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// How often the service prunes idle domains, in seconds (default: 60)
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
}

/// Domain allowlist configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllowlistConfig {
    /// Permitted domains. Empty means every domain is permitted.
    #[serde(default)]
    pub domains: Vec<String>,

    /// How entries are matched against hosts (default: suffix)
    #[serde(default)]
    pub match_mode: MatchMode,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_min_interval_ms() -> u64 {
    1000
}

fn default_prune_interval_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            allowlist: AllowlistConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            prune_interval_secs: default_prune_interval_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Build a config with the given minimum interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            min_interval_ms: interval.as_millis() as u64,
            ..Default::default()
        }
    }

    /// Get the minimum interval between admissions to one domain
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Get the prune period
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs.max(1))
    }
}

impl Config {
    /// Load configuration from environment variables on top of the defaults.
    ///
    /// - `BIND_ADDR`: server bind address
    /// - `MIN_INTERVAL_MS`: politeness interval per domain
    /// - `PRUNE_INTERVAL_SECS`: idle-domain prune period
    /// - `ALLOWLIST`: comma-separated domains
    /// - `ALLOWLIST_MATCH`: `suffix` or `substring`
    /// - `METRICS_ENABLED`: `true` or `false`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(v) = lookup("MIN_INTERVAL_MS") {
            config.rate_limit.min_interval_ms = parse_var("MIN_INTERVAL_MS", &v)?;
        }
        if let Some(v) = lookup("PRUNE_INTERVAL_SECS") {
            config.rate_limit.prune_interval_secs = parse_var("PRUNE_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = lookup("ALLOWLIST") {
            config.allowlist.domains = v
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = lookup("ALLOWLIST_MATCH") {
            config.allowlist.match_mode = parse_var("ALLOWLIST_MATCH", &v)?;
        }
        if let Some(v) = lookup("METRICS_ENABLED") {
            config.metrics.enabled = parse_var("METRICS_ENABLED", &v)?;
        }

        Ok(config)
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rate_limit.min_interval(), Duration::from_secs(1));
        assert!(config.allowlist.domains.is_empty());
        assert_eq!(config.allowlist.match_mode, MatchMode::DomainSuffix);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("MIN_INTERVAL_MS", "250"),
            ("ALLOWLIST", "example.com, , docs.rs"),
            ("ALLOWLIST_MATCH", "substring"),
            ("METRICS_ENABLED", "false"),
        ]))
        .unwrap();

        assert_eq!(config.rate_limit.min_interval(), Duration::from_millis(250));
        assert_eq!(config.allowlist.domains, vec!["example.com", "docs.rs"]);
        assert_eq!(config.allowlist.match_mode, MatchMode::Substring);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_invalid_value_rejected() {
        let err = Config::from_lookup(lookup_from(&[("MIN_INTERVAL_MS", "soon")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var: "MIN_INTERVAL_MS", .. }
        ));

        let err = Config::from_lookup(lookup_from(&[("ALLOWLIST_MATCH", "prefix")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var: "ALLOWLIST_MATCH", .. }
        ));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config = serde_json::from_str(
            r#"{"allowlist": {"domains": ["example.com"], "match_mode": "substring"}}"#,
        )
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.allowlist.match_mode, MatchMode::Substring);
        assert_eq!(config.rate_limit.min_interval_ms, 1000);
    }
}
