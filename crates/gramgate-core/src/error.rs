// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Gramgate transport bridge.

use thiserror::Error;

/// The primary error type used across all Gramgate crates.
///
/// The HTTP boundary maps variants to response codes: `Validation` and
/// `Media` become client errors, `NotFound` is handled per endpoint
/// (webhook endpoints deliberately answer with a success-like status to
/// stop upstream retries), everything else is a server error.
#[derive(Debug, Error)]
pub enum GramgateError {
    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Telegram Bot API errors (transport failure or an `ok: false` reply).
    #[error("telegram api error: {message}")]
    Telegram {
        message: String,
        status: Option<u16>,
    },

    /// CRM API errors (account API or message-gateway transport API).
    #[error("crm api error: {message}")]
    Crm {
        message: String,
        status: Option<u16>,
    },

    /// Attachment transcoding failed (download, format sniffing, re-encode
    /// or upload). Aborts the whole message send.
    #[error("media error: {0}")]
    Media(String),

    /// A referenced entity does not exist or is deactivated.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Request validation failed before any upstream call. The payload is
    /// a message-catalog key resolved to a localized string at the HTTP
    /// boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GramgateError {
    /// Shorthand for a storage error wrapping an arbitrary source.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GramgateError::Storage {
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = GramgateError::Crm {
            message: "channel does not exist".into(),
            status: Some(400),
        };
        assert!(err.to_string().contains("channel does not exist"));

        let err = GramgateError::NotFound { entity: "bot" };
        assert_eq!(err.to_string(), "bot not found");
    }

    #[test]
    fn storage_helper_wraps_source() {
        let err = GramgateError::storage(std::io::Error::other("disk gone"));
        assert!(err.to_string().contains("disk gone"));
    }
}
