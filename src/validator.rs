// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Candidate URL validator.
//!
//! A URL is fetchable when it parses, its scheme is `http` or `https`, and
//! it names a non-empty host. Every failure is reported as a
//! [`ValidationError`]; nothing here panics on hostile input.

use thiserror::Error;
use tracing::debug;
use url::Url;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Empty URL")]
    Empty,

    #[error("Malformed URL {url:?}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("Unsupported scheme {scheme:?}: only http and https are fetchable")]
    UnsupportedScheme { scheme: String },

    #[error("URL has no host")]
    MissingHost,
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// URL is fetchable
    Valid,
    /// URL is rejected
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }
}

/// Returns true if `url` is an `http`/`https` URL with a non-empty host.
pub fn is_valid(url: &str) -> bool {
    validate(url).is_valid()
}

/// Validate a candidate URL, reporting why it was rejected.
pub fn validate(url: &str) -> ValidationResult {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        debug!("Empty URL");
        return ValidationResult::Invalid(ValidationError::Empty);
    }

    let parsed = match Url::parse(trimmed) {
        Ok(u) => u,
        Err(e) => {
            debug!(url = %url, error = %e, "Malformed URL");
            return ValidationResult::Invalid(ValidationError::Malformed {
                url: url.to_string(),
                reason: e.to_string(),
            });
        }
    };

    // `Url` lower-cases the scheme while parsing
    if !matches!(parsed.scheme(), "http" | "https") {
        debug!(url = %url, scheme = parsed.scheme(), "Unsupported scheme");
        return ValidationResult::Invalid(ValidationError::UnsupportedScheme {
            scheme: parsed.scheme().to_string(),
        });
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => ValidationResult::Valid,
        _ => {
            debug!(url = %url, "URL has no host");
            ValidationResult::Invalid(ValidationError::MissingHost)
        }
    }
}

/// Lower-cased host of a parsable URL.
///
/// Does not check the scheme; pair with [`validate`] when that matters.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url.trim())
        .ok()?
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_lowercase)
}
