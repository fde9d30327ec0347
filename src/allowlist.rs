// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Domain allowlist filter.
//!
//! An empty allowlist permits everything; blank entries do not count. A
//! non-empty one fails closed: a URL whose host cannot be extracted is never
//! allowed.
//!
//! Two match modes exist. [`MatchMode::DomainSuffix`] (the default) permits
//! a host equal to an entry or ending in `.entry`. [`MatchMode::Substring`]
//! permits any host containing the entry, so `example.com` also lets
//! `example.com.evil.net` through; it is kept for deployments that depend on
//! containment semantics and should not be chosen for new ones.

use crate::config::AllowlistConfig;
use crate::validator::host_of;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// How allowlist entries are compared against a URL host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Host equals the entry or is a subdomain of it
    #[default]
    #[serde(rename = "suffix")]
    DomainSuffix,
    /// Entry appears anywhere in the host
    #[serde(rename = "substring")]
    Substring,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown match mode {0:?}, expected \"suffix\" or \"substring\"")]
pub struct ParseMatchModeError(String);

impl FromStr for MatchMode {
    type Err = ParseMatchModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suffix" => Ok(MatchMode::DomainSuffix),
            "substring" => Ok(MatchMode::Substring),
            other => Err(ParseMatchModeError(other.to_string())),
        }
    }
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainSuffix => write!(f, "suffix"),
            Self::Substring => write!(f, "substring"),
        }
    }
}

impl MatchMode {
    /// Check a lower-cased host against a lower-cased entry.
    fn matches(self, host: &str, entry: &str) -> bool {
        match self {
            MatchMode::Substring => host.contains(entry),
            MatchMode::DomainSuffix => {
                host == entry
                    || (host.len() > entry.len()
                        && host.ends_with(entry)
                        && host.as_bytes()[host.len() - entry.len() - 1] == b'.')
            }
        }
    }
}

/// Returns true if `url` is permitted by `allowlist` under the default match mode.
pub fn is_allowed<S: AsRef<str>>(url: &str, allowlist: &[S]) -> bool {
    is_allowed_with(url, allowlist, MatchMode::default())
}

/// Returns true if `url` is permitted by `allowlist` under `mode`.
pub fn is_allowed_with<S: AsRef<str>>(url: &str, allowlist: &[S], mode: MatchMode) -> bool {
    let entries: Vec<String> = allowlist
        .iter()
        .map(|entry| normalize_entry(entry.as_ref()))
        .filter(|entry| !entry.is_empty())
        .collect();
    if entries.is_empty() {
        return true;
    }

    let Some(host) = host_of(url) else {
        debug!(url = %url, "No host in URL, rejecting");
        return false;
    };

    entries.iter().any(|entry| mode.matches(&host, entry))
}

fn normalize_entry(entry: &str) -> String {
    entry.trim().trim_start_matches('.').to_lowercase()
}

/// Allowlist built once and shared for the lifetime of a gate.
#[derive(Debug, Clone, Default)]
pub struct AllowlistFilter {
    entries: Vec<String>,
    mode: MatchMode,
}

impl AllowlistFilter {
    /// Build a filter, normalising entries and dropping blank ones.
    pub fn new<I, S>(entries: I, mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|e| normalize_entry(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        Self { entries, mode }
    }

    pub fn from_config(config: &AllowlistConfig) -> Self {
        Self::new(&config.domains, config.match_mode)
    }

    /// Check a URL against this allowlist.
    pub fn is_allowed(&self, url: &str) -> bool {
        let allowed = is_allowed_with(url, &self.entries, self.mode);
        if !allowed {
            debug!(url = %url, mode = %self.mode, "URL not on allowlist");
        }
        allowed
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
