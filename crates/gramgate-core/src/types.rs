// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted domain models shared across the workspace.
//!
//! Timestamps are stored as RFC 3339 strings; the storage crate owns the
//! schema, this module only defines the row shapes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One CRM tenant's link between Gramgate and their account.
///
/// `mg_url`/`mg_token` stay empty until the CRM acknowledges the
/// integration registration; a connection with empty gateway credentials
/// cannot own active bots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub id: i64,
    /// Opaque generated identifier, unique per tenant.
    #[serde(default)]
    pub client_id: String,
    /// CRM account base URL.
    pub api_url: String,
    /// CRM account API key.
    pub api_key: String,
    /// Message-gateway base URL issued by the CRM on registration.
    #[serde(default)]
    pub mg_url: String,
    /// Message-gateway token issued by the CRM on registration.
    #[serde(default)]
    pub mg_token: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Connection {
    /// Whether the connection holds usable message-gateway credentials.
    pub fn has_gateway_credentials(&self) -> bool {
        !self.mg_url.is_empty() && !self.mg_token.is_empty()
    }
}

/// One Telegram bot, owned by exactly one [`Connection`].
///
/// `channel_id` is 0 until the CRM activates the channel;
/// `settings_hash` is the last capability fingerprint the CRM
/// acknowledged for this channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub connection_id: i64,
    /// CRM-issued channel identifier; 0 means unregistered.
    #[serde(default)]
    pub channel_id: u64,
    #[serde(default)]
    pub settings_hash: String,
    /// Globally unique bot token.
    pub token: String,
    /// Bot username as reported by Telegram.
    #[serde(default)]
    pub name: String,
    /// Preferred language code (en/ru/es).
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Cached profile of a Telegram end user, keyed by the numeric user ID.
///
/// `photo_id` and `photo_url` are always written together so the stored
/// URL can never point at a stale avatar identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TgUser {
    #[serde(default)]
    pub id: i64,
    pub external_id: i64,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub photo_id: String,
    #[serde(default)]
    pub updated_at: String,
}

impl TgUser {
    /// Whether the cached record is older than `refresh_interval_secs`.
    ///
    /// Records with an unparsable or missing timestamp count as expired.
    pub fn expired(&self, refresh_interval_secs: u64) -> bool {
        let Ok(updated) = DateTime::parse_from_rfc3339(&self.updated_at) else {
            return true;
        };
        let age = Utc::now().signed_duration_since(updated.with_timezone(&Utc));
        age > Duration::seconds(refresh_interval_secs as i64)
    }
}

/// Current UTC time as the RFC 3339 string stored in timestamp columns.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
