// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome bookkeeping for crawl simulations.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Possible outcomes for a candidate URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Admitted,
    Throttled,
    InvalidUrl,
    NotAllowed,
}

/// Collects outcomes and admission instants during a simulated crawl.
#[derive(Debug, Default)]
pub struct CrawlMetrics {
    outcomes: HashMap<Outcome, usize>,
    admissions: HashMap<String, Vec<Instant>>,
    waits: Vec<Duration>,
}

impl CrawlMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_refusal(&mut self, outcome: Outcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    pub fn record_admission(&mut self, domain: &str, at: Instant, waited: Duration, throttled: bool) {
        let outcome = if throttled {
            Outcome::Throttled
        } else {
            Outcome::Admitted
        };
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        self.admissions.entry(domain.to_string()).or_default().push(at);
        self.waits.push(waited);
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Admitted requests, throttled or not.
    pub fn admitted(&self) -> usize {
        self.count(Outcome::Admitted) + self.count(Outcome::Throttled)
    }

    pub fn refused(&self) -> usize {
        self.count(Outcome::InvalidUrl) + self.count(Outcome::NotAllowed)
    }

    pub fn domains(&self) -> usize {
        self.admissions.len()
    }

    /// Smallest gap between two admissions to the same domain.
    pub fn min_same_domain_gap(&self) -> Option<Duration> {
        self.admissions
            .values()
            .flat_map(|times| {
                let mut sorted = times.clone();
                sorted.sort();
                sorted
                    .windows(2)
                    .map(|w| w[1] - w[0])
                    .collect::<Vec<_>>()
            })
            .min()
    }

    pub fn max_wait(&self) -> Duration {
        self.waits.iter().copied().max().unwrap_or(Duration::ZERO)
    }
}

impl std::fmt::Display for CrawlMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Crawl Metrics Report ===")?;
        writeln!(f, "Candidates:        {}", self.total())?;
        writeln!(f, "Admitted:          {}", self.count(Outcome::Admitted))?;
        writeln!(f, "Admitted (waited): {}", self.count(Outcome::Throttled))?;
        writeln!(f, "Invalid URL:       {}", self.count(Outcome::InvalidUrl))?;
        writeln!(f, "Not allowed:       {}", self.count(Outcome::NotAllowed))?;
        writeln!(f, "Domains:           {}", self.domains())?;
        writeln!(f, "Min gap:           {:?}", self.min_same_domain_gap())?;
        writeln!(f, "Max wait:          {:?}", self.max_wait())?;
        Ok(())
    }
}
