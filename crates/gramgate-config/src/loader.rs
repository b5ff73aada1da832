// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./gramgate.toml` > `~/.config/gramgate/gramgate.toml`
//! > `/etc/gramgate/gramgate.toml` with environment variable overrides via
//! the `GRAMGATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::GramgateConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/gramgate/gramgate.toml` (system-wide)
/// 3. `~/.config/gramgate/gramgate.toml` (user XDG config)
/// 4. `./gramgate.toml` (local directory)
/// 5. `GRAMGATE_*` environment variables
pub fn load_config() -> Result<GramgateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GramgateConfig::default()))
        .merge(Toml::file("/etc/gramgate/gramgate.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("gramgate/gramgate.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("gramgate.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<GramgateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GramgateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GramgateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GramgateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `GRAMGATE_HTTP_TIMEOUT_SECS` must map
/// to `http.timeout_secs`, not `http.timeout.secs`.
fn env_provider() -> Env {
    Env::prefixed("GRAMGATE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("transport_", "transport.", 1)
            .replacen("http_", "http.", 1)
            .replacen("profile_", "profile.", 1)
            .replacen("avatar_", "avatar.", 1)
            .replacen("crm_", "crm.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_str_applies_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:3001");
        assert_eq!(config.http.timeout_secs, 10);
    }

    #[test]
    fn load_from_str_merges_over_defaults() {
        let config = load_config_from_str(
            r#"
            [http]
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.http.timeout_secs, 30);
        // Untouched sections keep their defaults.
        assert_eq!(config.profile.refresh_interval_secs, 86_400);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(load_config_from_str("this is not toml [").is_err());
    }
}
