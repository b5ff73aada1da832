// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for relay tests: a bridge wired to mock upstreams, a
//! seeded connection/bot pair, and a counting avatar store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use gramgate_config::GramgateConfig;
use gramgate_core::types::now_rfc3339;
use gramgate_core::{AvatarStore, Bot, Connection, GramgateError};
use gramgate_storage::{Database, queries};
use gramgate_telegram::Update;
use gramgate_telegram::types::{Chat, Message, User};
use wiremock::MockServer;

use crate::context::Bridge;
use crate::locale::Locales;

/// Avatar store that records uploads and returns a fixed URL.
pub(crate) struct MockAvatarStore {
    url: String,
    uploads: AtomicUsize,
}

impl MockAvatarStore {
    pub(crate) fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            uploads: AtomicUsize::new(0),
        }
    }

    pub(crate) fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AvatarStore for MockAvatarStore {
    async fn upload(&self, _source_url: &str) -> Result<String, GramgateError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(self.url.clone())
    }
}

/// A bridge against mock Telegram and CRM servers, with one active
/// connection owning one bot (token `123:ABC`, channel 7, stale
/// fingerprint).
pub(crate) struct TestEnv {
    pub(crate) bridge: Bridge,
    pub(crate) conn: Connection,
    pub(crate) bot: Bot,
    pub(crate) telegram_server: MockServer,
    pub(crate) crm_server: MockServer,
    _dir: tempfile::TempDir,
}

impl TestEnv {
    pub(crate) async fn start() -> Self {
        let telegram_server = MockServer::start().await;
        let crm_server = MockServer::start().await;

        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let mut config = GramgateConfig::default();
        config.http.telegram_api_base = telegram_server.uri();
        config.server.host = "bridge.test".into();

        let locales = Arc::new(Locales::load().unwrap());
        let avatars: Arc<dyn AvatarStore> =
            Arc::new(MockAvatarStore::new("https://cdn.example.com/avatar.jpg"));

        let bridge = Bridge::new(Arc::new(config), db, locales, avatars).unwrap();

        let mut conn = Connection {
            client_id: "client-1".into(),
            api_url: crm_server.uri(),
            api_key: "api-key".into(),
            mg_url: crm_server.uri(),
            mg_token: "mg-token".into(),
            active: true,
            created_at: now_rfc3339(),
            updated_at: now_rfc3339(),
            ..Default::default()
        };
        conn.id = queries::connections::create_connection(&bridge.db, &conn)
            .await
            .unwrap();

        let mut bot = Bot {
            connection_id: conn.id,
            channel_id: 7,
            settings_hash: "stale-fingerprint".into(),
            token: "123:ABC".into(),
            name: "demo_bot".into(),
            lang: "en".into(),
            created_at: now_rfc3339(),
            updated_at: now_rfc3339(),
            ..Default::default()
        };
        bot.id = queries::bots::create_bot(&bridge.db, &bot).await.unwrap();

        Self {
            bridge,
            conn,
            bot,
            telegram_server,
            crm_server,
            _dir: dir,
        }
    }
}

/// A plain text message update from user 42-style fixtures.
pub(crate) fn text_update(message_id: i64, from_id: i64, chat_id: i64, text: &str) -> Update {
    Update {
        update_id: 1,
        message: Some(Message {
            message_id,
            from: Some(User {
                id: from_id,
                first_name: "Ann".into(),
                username: Some("ann".into()),
                ..Default::default()
            }),
            chat: Chat {
                id: chat_id,
                kind: "private".into(),
            },
            date: 1_700_000_000,
            text: (!text.is_empty()).then(|| text.to_string()),
            ..Default::default()
        }),
        edited_message: None,
    }
}
