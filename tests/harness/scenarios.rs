// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Crawl frontier patterns for exercising the gate.

use std::time::Duration;

/// Crawl pattern configuration.
#[derive(Debug, Clone)]
pub struct CrawlScenario {
    /// Number of distinct target domains
    pub domains: usize,
    /// URLs queued per domain
    pub per_domain: usize,
    /// Politeness interval per domain
    pub interval: Duration,
    /// Restrict the allowlist to the first N domains (None = open)
    pub allow_first: Option<usize>,
    /// Malformed URLs mixed into the frontier
    pub junk_urls: usize,
}

impl Default for CrawlScenario {
    fn default() -> Self {
        Self {
            domains: 1,
            per_domain: 5,
            interval: Duration::from_millis(500),
            allow_first: None,
            junk_urls: 0,
        }
    }
}

/// Predefined crawl patterns.
impl CrawlScenario {
    /// Every task hammers one domain at once.
    pub fn single_domain_flood() -> Self {
        Self {
            domains: 1,
            per_domain: 8,
            ..Default::default()
        }
    }

    /// Many domains, one URL each; nobody should wait.
    pub fn wide_fanout() -> Self {
        Self {
            domains: 50,
            per_domain: 1,
            ..Default::default()
        }
    }

    /// Mixed frontier: some domains off the allowlist and junk URLs.
    pub fn mixed_frontier() -> Self {
        Self {
            domains: 6,
            per_domain: 3,
            allow_first: Some(2),
            junk_urls: 4,
            ..Default::default()
        }
    }

    /// Lower bound on the crawl's duration with perfect politeness.
    pub fn minimum_duration(&self) -> Duration {
        self.interval * self.per_domain.saturating_sub(1) as u32
    }
}
