// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared application context.
//!
//! One [`Bridge`] is constructed at startup and passed by reference into
//! every handler and relay operation; there is no global mutable state.
//! Upstream clients are built per call from the shared `reqwest::Client`,
//! so connection pooling and the configured timeout apply everywhere.

use std::sync::Arc;
use std::time::Duration;

use gramgate_config::GramgateConfig;
use gramgate_core::{AvatarStore, Connection, GramgateError};
use gramgate_crm::{AccountClient, TransportClient};
use gramgate_storage::Database;
use gramgate_telegram::TelegramClient;

use crate::locale::Locales;

/// Everything a relay operation needs: configuration, storage, the
/// localizer, the avatar store and the pooled HTTP client.
pub struct Bridge {
    pub config: Arc<GramgateConfig>,
    pub db: Database,
    pub locales: Arc<Locales>,
    pub avatars: Arc<dyn AvatarStore>,
    pub http: reqwest::Client,
}

impl Bridge {
    /// Builds the context, applying the configured per-call timeout to the
    /// shared HTTP client.
    pub fn new(
        config: Arc<GramgateConfig>,
        db: Database,
        locales: Arc<Locales>,
        avatars: Arc<dyn AvatarStore>,
    ) -> Result<Self, GramgateError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()
            .map_err(|e| GramgateError::Internal(format!("http client build failed: {e}")))?;

        Ok(Self {
            config,
            db,
            locales,
            avatars,
            http,
        })
    }

    /// Telegram client addressing one bot.
    pub fn telegram(&self, bot_token: &str) -> TelegramClient {
        TelegramClient::new(
            self.http.clone(),
            &self.config.http.telegram_api_base,
            bot_token,
        )
    }

    /// Message-gateway client for one connection.
    pub fn transport(&self, conn: &Connection) -> TransportClient {
        TransportClient::new(self.http.clone(), &conn.mg_url, &conn.mg_token)
    }

    /// Account API client for one connection.
    pub fn account(&self, conn: &Connection) -> AccountClient {
        AccountClient::new(self.http.clone(), &conn.api_url, &conn.api_key)
    }

    /// Webhook URL Telegram should deliver a bot's updates to.
    pub fn telegram_webhook_url(&self, bot_token: &str) -> String {
        format!("https://{}/telegram/{bot_token}", self.config.server.host)
    }

    /// Public base URL of this bridge.
    pub fn public_base_url(&self) -> String {
        format!("https://{}", self.config.server.host)
    }
}
