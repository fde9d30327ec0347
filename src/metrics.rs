// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for gate decisions.

use crate::sanitizer::Sanitized;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Gate counters, registered on a private registry.
#[derive(Clone)]
pub struct GateMetrics {
    registry: Registry,
    verdicts: IntCounterVec,
    throttled: IntCounter,
    sanitizer_removals: IntCounterVec,
}

impl GateMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let verdicts = IntCounterVec::new(
            Opts::new("fetch_gate_verdicts_total", "URL verdicts by outcome"),
            &["verdict"],
        )?;
        let throttled = IntCounter::new(
            "fetch_gate_throttled_total",
            "Admissions that had to wait for the politeness interval",
        )?;
        let sanitizer_removals = IntCounterVec::new(
            Opts::new(
                "fetch_gate_sanitizer_removals_total",
                "Spans removed from fetched markup by rule",
            ),
            &["rule"],
        )?;

        registry.register(Box::new(verdicts.clone()))?;
        registry.register(Box::new(throttled.clone()))?;
        registry.register(Box::new(sanitizer_removals.clone()))?;

        Ok(Self {
            registry,
            verdicts,
            throttled,
            sanitizer_removals,
        })
    }

    pub fn record_verdict(&self, verdict: &str) {
        self.verdicts.with_label_values(&[verdict]).inc();
    }

    pub fn record_throttled(&self) {
        self.throttled.inc();
    }

    pub fn record_sanitized(&self, report: &Sanitized) {
        for (rule, count) in &report.removals {
            self.sanitizer_removals
                .with_label_values(&[rule.as_str()])
                .inc_by(*count as u64);
        }
    }

    /// Render all counters in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
