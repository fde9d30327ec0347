// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! The fetch gate: validator, allowlist and limiter in pipeline order.
//!
//! A fetcher calls [`FetchGate::admit`] before each request and
//! [`FetchGate::sanitize`] on each body it gets back.

use crate::allowlist::AllowlistFilter;
use crate::config::Config;
use crate::limiter::{Admission, RateLimiter};
use crate::metrics::GateMetrics;
use crate::sanitizer::sanitize_with_report;
use crate::validator::{host_of, validate, ValidationError, ValidationResult};
use thiserror::Error;
use tracing::{debug, info};

/// Why the gate refused a URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ValidationError),

    #[error("Host {host} is not on the allowlist")]
    NotAllowed { host: String },
}

impl GateError {
    /// Stable label used in metrics and API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::NotAllowed { .. } => "NOT_ALLOWED",
        }
    }
}

/// Pre-fetch policy gate shared by every fetch pipeline.
pub struct FetchGate {
    allowlist: AllowlistFilter,
    limiter: RateLimiter,
    metrics: Option<GateMetrics>,
}

impl FetchGate {
    pub fn new(config: &Config) -> Self {
        Self::from_parts(
            AllowlistFilter::from_config(&config.allowlist),
            RateLimiter::new(config.rate_limit.clone()),
        )
    }

    pub fn from_parts(allowlist: AllowlistFilter, limiter: RateLimiter) -> Self {
        Self {
            allowlist,
            limiter,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: GateMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn allowlist(&self) -> &AllowlistFilter {
        &self.allowlist
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn metrics(&self) -> Option<&GateMetrics> {
        self.metrics.as_ref()
    }

    /// Run a URL through the validator and the allowlist, returning its host.
    pub fn evaluate(&self, url: &str) -> Result<String, GateError> {
        let verdict = self.evaluate_inner(url);
        if let Some(metrics) = &self.metrics {
            match &verdict {
                Ok(_) => metrics.record_verdict("allowed"),
                Err(e) => metrics.record_verdict(e.code()),
            }
        }
        verdict
    }

    fn evaluate_inner(&self, url: &str) -> Result<String, GateError> {
        if let ValidationResult::Invalid(err) = validate(url) {
            return Err(err.into());
        }
        let host = host_of(url).ok_or(ValidationError::MissingHost)?;

        if !self.allowlist.is_allowed(url) {
            return Err(GateError::NotAllowed { host });
        }
        Ok(host)
    }

    /// Evaluate a URL and, if it passes, wait for its domain's slot.
    pub async fn admit(&self, url: &str) -> Result<Admission, GateError> {
        let host = match self.evaluate(url) {
            Ok(host) => host,
            Err(err) => {
                info!(url = %url, error = %err, "URL refused");
                return Err(err);
            }
        };

        let admission = self.limiter.await_slot(&host).await;
        if admission.observed.is_throttled() {
            if let Some(metrics) = &self.metrics {
                metrics.record_throttled();
            }
        }
        debug!(url = %url, waited = ?admission.waited, "URL admitted");
        Ok(admission)
    }

    /// The candidates that pass both validator and allowlist, in input order.
    pub fn filter_urls<'a, I>(&self, urls: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        urls.into_iter()
            .filter(|url| self.evaluate(url).is_ok())
            .collect()
    }

    /// Sanitize a fetched body.
    pub fn sanitize(&self, body: &str) -> String {
        let report = sanitize_with_report(body);
        if let Some(metrics) = &self.metrics {
            metrics.record_sanitized(&report);
        }
        report.content
    }
}
