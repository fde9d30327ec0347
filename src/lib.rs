// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Polite Fetch Gate
//!
//! A policy layer a web fetcher consults before and after each request:
//!
//! - URL validation (http/https with a host only)
//! - Domain allowlisting (open when empty, fail-closed on unparsable URLs)
//! - Per-domain politeness delay with cooperative suspension
//! - Sanitization of fetched markup (scripts, styles, inline event handlers)
//!
//! ```no_run
//! # async fn crawl() {
//! use polite_fetch_gate::{Config, FetchGate};
//!
//! let gate = FetchGate::new(&Config::default());
//! if let Ok(admission) = gate.admit("https://example.com/").await {
//!     // fetch `https://example.com/` here, then:
//!     let body = gate.sanitize("<p onclick=\"x()\">hello</p>");
//!     # let _ = (admission, body);
//! }
//! # }
//! ```

pub mod allowlist;
pub mod config;
pub mod gate;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod sanitizer;
pub mod validator;

pub use allowlist::{is_allowed, is_allowed_with, AllowlistFilter, MatchMode};
pub use config::Config;
pub use gate::{FetchGate, GateError};
pub use limiter::{Admission, RateLimiter, SlotState};
pub use sanitizer::{sanitize, Sanitized};
pub use validator::{is_valid, ValidationError, ValidationResult};
