// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-domain politeness delay.
//!
//! Each domain moves through three states:
//!
//! - `Unvisited`: no admission recorded
//! - `Ready`: the minimum interval has passed since the last admission
//! - `Throttled`: a caller arrived early and suspends for the remainder
//!
//! Admission records the current instant and restarts the interval.
//!
//! The table lock is only held to look up a domain's slot. The slot's own
//! async mutex is held across the decide/sleep/record sequence, so callers
//! for one domain are serialised while other domains proceed untouched. A
//! caller dropped mid-sleep records nothing.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

/// State of a domain as seen by an arriving caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No admission recorded for this domain
    Unvisited,
    /// Interval elapsed since the last admission
    Ready,
    /// Caller must wait before admission
    Throttled {
        /// Time until the domain is ready again
        retry_after: Duration,
    },
}

impl SlotState {
    pub fn is_throttled(&self) -> bool {
        matches!(self, SlotState::Throttled { .. })
    }
}

impl std::fmt::Display for SlotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unvisited => write!(f, "unvisited"),
            Self::Ready => write!(f, "ready"),
            Self::Throttled { retry_after } => write!(f, "throttled ({retry_after:?})"),
        }
    }
}

/// Outcome of [`RateLimiter::await_slot`].
#[derive(Debug, Clone)]
pub struct Admission {
    /// Normalised domain key
    pub domain: String,
    /// State observed once the caller reached the front of the domain's queue
    pub observed: SlotState,
    /// Total suspension, including time queued behind same-domain callers
    pub waited: Duration,
    /// Recorded admission instant
    pub admitted_at: Instant,
}

#[derive(Debug, Default)]
struct DomainSlot {
    last_admitted: Option<Instant>,
}

impl DomainSlot {
    fn state(&self, now: Instant, interval: Duration) -> SlotState {
        match self.last_admitted {
            None => SlotState::Unvisited,
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                if elapsed >= interval {
                    SlotState::Ready
                } else {
                    SlotState::Throttled {
                        retry_after: interval - elapsed,
                    }
                }
            }
        }
    }

    fn is_idle(&self, now: Instant, interval: Duration) -> bool {
        !self.state(now, interval).is_throttled()
    }
}

/// Per-domain rate limiter shared by every fetch pipeline of one gate.
pub struct RateLimiter {
    min_interval: Duration,
    slots: Mutex<HashMap<String, Arc<Mutex<DomainSlot>>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_interval(config.min_interval())
    }

    pub fn with_interval(min_interval: Duration) -> Self {
        Self {
            min_interval,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until `domain` may be requested again, then record the request.
    pub async fn await_slot(&self, domain: &str) -> Admission {
        let started = Instant::now();
        let key = normalize_domain(domain);
        let slot = self.slot_for(&key).await;

        let mut slot = slot.lock().await;
        let observed = slot.state(Instant::now(), self.min_interval);

        if let (SlotState::Throttled { retry_after }, Some(last)) = (observed, slot.last_admitted) {
            debug!(domain = %key, ?retry_after, "Domain throttled, waiting");
            sleep_until(last + self.min_interval).await;
        }

        let admitted_at = Instant::now();
        slot.last_admitted = Some(admitted_at);
        let waited = admitted_at.saturating_duration_since(started);

        trace!(domain = %key, state = %observed, ?waited, "Request admitted");
        Admission {
            domain: key,
            observed,
            waited,
            admitted_at,
        }
    }

    /// Report a domain's state without waiting or recording anything.
    ///
    /// While another caller holds the domain, the result is `Throttled` with
    /// the full interval, which is a lower bound on the real wait.
    pub async fn check(&self, domain: &str) -> SlotState {
        let key = normalize_domain(domain);
        let slots = self.slots.lock().await;
        let Some(slot) = slots.get(&key) else {
            return SlotState::Unvisited;
        };

        let state = match slot.try_lock() {
            Ok(slot) => slot.state(Instant::now(), self.min_interval),
            Err(_) => SlotState::Throttled {
                retry_after: self.min_interval,
            },
        };
        state
    }

    /// Drop domains that are idle and unheld. Returns how many were removed.
    ///
    /// An entry whose interval has elapsed behaves exactly like an unvisited
    /// domain, so removing it cannot let two requests through too closely.
    pub async fn prune_idle(&self) -> usize {
        let now = Instant::now();
        let interval = self.min_interval;
        let mut slots = self.slots.lock().await;
        let before = slots.len();

        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(state) => !state.is_idle(now, interval),
                Err(_) => true,
            }
        });

        let removed = before - slots.len();
        if removed > 0 {
            debug!(removed, remaining = slots.len(), "Pruned idle domains");
        }
        removed
    }

    /// Number of domains currently held in the table.
    pub async fn tracked_domains(&self) -> usize {
        self.slots.lock().await.len()
    }

    async fn slot_for(&self, key: &str) -> Arc<Mutex<DomainSlot>> {
        let mut slots = self.slots.lock().await;
        Arc::clone(slots.entry(key.to_string()).or_default())
    }
}

/// Normalise a domain key: trimmed, lower-cased, without a trailing dot.
fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_lowercase()
}
