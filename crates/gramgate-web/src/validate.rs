// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request validation that runs before any upstream call.

use regex::Regex;
use tracing::error;

/// Whether a tenant's CRM base URL matches the configured shape.
///
/// The pattern comes from `crm.url_pattern`; an uncompilable pattern
/// rejects everything rather than letting arbitrary URLs through.
pub fn is_valid_crm_url(pattern: &str, url: &str) -> bool {
    match Regex::new(pattern) {
        Ok(regex) => regex.is_match(url),
        Err(e) => {
            error!(pattern, error = %e, "crm.url_pattern does not compile");
            false
        }
    }
}

/// Strips trailing slashes the way account URLs arrive from copy-paste.
pub fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_PATTERN: &str = r"^https://[a-z0-9][a-z0-9.-]*\.[a-z]{2,}$";

    #[test]
    fn accepts_https_hosts() {
        assert!(is_valid_crm_url(DEFAULT_PATTERN, "https://demo.simla.com"));
        assert!(is_valid_crm_url(DEFAULT_PATTERN, "https://my-shop.crm.example.com"));
    }

    #[test]
    fn rejects_http_and_paths() {
        assert!(!is_valid_crm_url(DEFAULT_PATTERN, "http://demo.simla.com"));
        assert!(!is_valid_crm_url(DEFAULT_PATTERN, "https://demo.simla.com/admin"));
        assert!(!is_valid_crm_url(DEFAULT_PATTERN, "demo.simla.com"));
        assert!(!is_valid_crm_url(DEFAULT_PATTERN, ""));
    }

    #[test]
    fn broken_pattern_rejects_everything() {
        assert!(!is_valid_crm_url("([unclosed", "https://demo.simla.com"));
    }

    #[test]
    fn normalize_strips_trailing_slashes() {
        assert_eq!(
            normalize_url("https://demo.simla.com///"),
            "https://demo.simla.com"
        );
        assert_eq!(
            normalize_url("https://demo.simla.com"),
            "https://demo.simla.com"
        );
    }
}
