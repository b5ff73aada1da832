// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Gramgate transport bridge.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup and environment
//! variable overrides via the `GRAMGATE_` prefix.

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::GramgateConfig;

use gramgate_core::GramgateError;

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<GramgateConfig, GramgateError> {
    let config = loader::load_config()
        .map_err(|e| GramgateError::Config(e.to_string()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<GramgateConfig, GramgateError> {
    let config = loader::load_config_from_str(toml_content)
        .map_err(|e| GramgateError::Config(e.to_string()))?;
    validation::validate_config(&config)?;
    Ok(config)
}
