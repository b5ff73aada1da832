// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization configuration validation.

use gramgate_core::GramgateError;

use crate::model::GramgateConfig;

/// Validate cross-field constraints figment cannot express.
pub fn validate_config(config: &GramgateConfig) -> Result<(), GramgateError> {
    if config.server.host.is_empty() {
        return Err(GramgateError::Config(
            "server.host must not be empty; webhook URLs are built from it".into(),
        ));
    }

    if config.server.bind.parse::<std::net::SocketAddr>().is_err() {
        return Err(GramgateError::Config(format!(
            "server.bind is not a valid socket address: {}",
            config.server.bind
        )));
    }

    if config.http.timeout_secs == 0 {
        return Err(GramgateError::Config(
            "http.timeout_secs must be greater than zero".into(),
        ));
    }

    if !config.avatar.bucket.is_empty() && config.avatar.region.is_empty() {
        return Err(GramgateError::Config(
            "avatar.region is required when avatar.bucket is set".into(),
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.log_level.as_str()) {
        return Err(GramgateError::Config(format!(
            "log_level must be one of {valid_levels:?}, got {:?}",
            config.log_level
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GramgateConfig::default()).is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = GramgateConfig::default();
        config.http.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn bucket_without_region_is_rejected() {
        let mut config = GramgateConfig::default();
        config.avatar.bucket = "avatars".into();
        assert!(validate_config(&config).is_err());
        config.avatar.region = "eu-west-1".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let mut config = GramgateConfig::default();
        config.server.bind = "not-an-addr".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let mut config = GramgateConfig::default();
        config.log_level = "loud".into();
        assert!(validate_config(&config).is_err());
    }
}
