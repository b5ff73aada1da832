// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Gramgate transport bridge.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Gramgate configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GramgateConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Identity reported to the CRM when registering the integration.
    #[serde(default)]
    pub transport: TransportInfo,

    /// Outbound HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// End-user profile cache settings.
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Avatar blob-store settings.
    #[serde(default)]
    pub avatar: AvatarConfig,

    /// CRM account linking settings.
    #[serde(default)]
    pub crm: CrmConfig,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GramgateConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            transport: TransportInfo::default(),
            http: HttpConfig::default(),
            profile: ProfileConfig::default(),
            avatar: AvatarConfig::default(),
            crm: CrmConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Public hostname used when building webhook and asset URLs handed
    /// to Telegram and the CRM. Must be reachable over HTTPS.
    #[serde(default = "default_host")]
    pub host: String,

    /// Address the server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            bind: default_bind(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("gramgate").join("gramgate.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("gramgate.db"))
        .to_string_lossy()
        .into_owned()
}

/// Integration identity registered with the CRM account API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TransportInfo {
    /// Human-readable integration name.
    #[serde(default = "default_transport_name")]
    pub name: String,

    /// Integration code, unique per transport kind.
    #[serde(default = "default_transport_code")]
    pub code: String,

    /// Path of the logo asset served from this host.
    #[serde(default = "default_logo_path")]
    pub logo_path: String,
}

impl Default for TransportInfo {
    fn default() -> Self {
        Self {
            name: default_transport_name(),
            code: default_transport_code(),
            logo_path: default_logo_path(),
        }
    }
}

fn default_transport_name() -> String {
    "Telegram".to_string()
}

fn default_transport_code() -> String {
    "telegram".to_string()
}

fn default_logo_path() -> String {
    "/static/telegram_logo.svg".to_string()
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-call timeout applied to every Telegram, CRM and blob-store
    /// request. An unresponsive upstream must not stall a webhook handler
    /// indefinitely.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Telegram Bot API base URL. Overridable for tests.
    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            telegram_api_base: default_telegram_api_base(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

/// End-user profile cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Seconds after which a cached user profile is re-fetched from
    /// Telegram.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

fn default_refresh_interval_secs() -> u64 {
    86_400
}

/// Avatar blob-store (S3) configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AvatarConfig {
    /// Bucket name. Empty disables avatar re-hosting.
    #[serde(default)]
    pub bucket: String,

    /// AWS region of the bucket.
    #[serde(default)]
    pub region: String,

    /// Key prefix (folder) for stored avatars.
    #[serde(default = "default_avatar_prefix")]
    pub key_prefix: String,

    /// Content type recorded on stored objects.
    #[serde(default = "default_avatar_content_type")]
    pub content_type: String,

    /// Optional public base URL override. Defaults to the bucket's
    /// virtual-hosted S3 URL when empty.
    #[serde(default)]
    pub public_url_base: String,
}

/// CRM account linking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrmConfig {
    /// Regex a tenant's CRM base URL must match before any upstream call
    /// is made on its behalf.
    #[serde(default = "default_crm_url_pattern")]
    pub url_pattern: String,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            url_pattern: default_crm_url_pattern(),
        }
    }
}

fn default_crm_url_pattern() -> String {
    r"^https://[a-z0-9][a-z0-9.-]*\.[a-z]{2,}$".to_string()
}

fn default_avatar_prefix() -> String {
    "avatars".to_string()
}

fn default_avatar_content_type() -> String {
    "image/jpeg".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = GramgateConfig::default();
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.http.telegram_api_base, "https://api.telegram.org");
        assert_eq!(config.profile.refresh_interval_secs, 86_400);
        assert_eq!(config.transport.code, "telegram");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
            [server]
            host = "bridge.example.com"
            port = 8080
        "#;
        let result: Result<GramgateConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "unknown key `port` must be rejected");
    }

    #[test]
    fn sections_deserialize_independently() {
        let toml = r#"
            log_level = "debug"

            [server]
            host = "bridge.example.com"

            [avatar]
            bucket = "gramgate-avatars"
            region = "eu-west-1"
        "#;
        let config: GramgateConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "bridge.example.com");
        assert_eq!(config.server.bind, "127.0.0.1:3001");
        assert_eq!(config.avatar.bucket, "gramgate-avatars");
        assert_eq!(config.avatar.key_prefix, "avatars");
        assert_eq!(config.log_level, "debug");
    }
}
