// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests through the HTTP surface, with both upstreams mocked.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use gramgate_config::GramgateConfig;
use gramgate_core::types::now_rfc3339;
use gramgate_core::{AvatarStore, Bot, Connection, GramgateError, TokenGenerator};
use gramgate_relay::{Bridge, Locales};
use gramgate_storage::{Database, queries};
use gramgate_web::{AppState, build_router};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct NullAvatarStore;

#[async_trait]
impl AvatarStore for NullAvatarStore {
    async fn upload(&self, _source_url: &str) -> Result<String, GramgateError> {
        Ok("https://cdn.example.com/avatar.jpg".to_string())
    }
}

struct FixedTokenGenerator;

impl TokenGenerator for FixedTokenGenerator {
    fn generate(&self) -> String {
        "generated-client-id".to_string()
    }
}

struct TestApp {
    app: Router,
    state: AppState,
    telegram_server: MockServer,
    crm_server: MockServer,
    bot: Bot,
    _dir: tempfile::TempDir,
}

async fn test_app() -> TestApp {
    let telegram_server = MockServer::start().await;
    let crm_server = MockServer::start().await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

    let mut config = GramgateConfig::default();
    config.http.telegram_api_base = telegram_server.uri();
    config.server.host = "bridge.test".into();
    // Mock servers answer on plain http://127.0.0.1.
    config.crm.url_pattern = "^https?://.*".into();

    let bridge = Bridge::new(
        Arc::new(config),
        db,
        Arc::new(Locales::load().unwrap()),
        Arc::new(NullAvatarStore),
    )
    .unwrap();

    let state = AppState {
        bridge: Arc::new(bridge),
        tokens: Arc::new(FixedTokenGenerator),
    };

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
    conn.id = queries::connections::create_connection(&state.bridge.db, &conn)
        .await
        .unwrap();

    let mut bot = Bot {
        connection_id: conn.id,
        channel_id: 7,
        settings_hash: "stale".into(),
        token: "123:ABC".into(),
        name: "demo_bot".into(),
        lang: "en".into(),
        created_at: now_rfc3339(),
        updated_at: now_rfc3339(),
        ..Default::default()
    };
    bot.id = queries::bots::create_bot(&state.bridge.db, &bot).await.unwrap();

    TestApp {
        app: build_router(state.clone()),
        state,
        telegram_server,
        crm_server,
        bot,
        _dir: dir,
    }
}

async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

async fn mount_empty_profile(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/getUserProfilePhotos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {"total_count": 0, "photos": []}
        })))
        .mount(server)
        .await;
}

fn text_update_json(message_id: i64, from_id: i64, chat_id: i64, text: &str) -> serde_json::Value {
    serde_json::json!({
        "update_id": 1,
        "message": {
            "message_id": message_id,
            "from": {"id": from_id, "first_name": "Ann", "username": "ann"},
            "chat": {"id": chat_id, "type": "private"},
            "date": 1700000000,
            "text": text
        }
    })
}

#[tokio::test]
async fn inbound_text_message_reaches_crm_with_native_ids() {
    let t = test_app().await;
    mount_empty_profile(&t.telegram_server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/messages"))
        .and(body_partial_json(serde_json::json!({
            "message": {"external_id": "77", "type": "text", "text": "hi"},
            "channel": 7,
            "external_chat_id": "100"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message_id": 1})))
        .expect(1)
        .mount(&t.crm_server)
        .await;

    let response = post_json(
        &t.app,
        "/telegram/123:ABC",
        text_update_json(77, 42, 100, "hi"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn inbound_sticker_uploads_then_sends() {
    let t = test_app().await;
    mount_empty_profile(&t.telegram_server).await;

    Mock::given(method("POST"))
        .and(path("/bot123:ABC/getFile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {"file_id": "sticker-1", "file_path": "stickers/s.webp"}
        })))
        .mount(&t.telegram_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/files/upload_by_url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "item-1"})))
        .expect(1)
        .mount(&t.crm_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/messages"))
        .and(body_partial_json(serde_json::json!({
            "message": {"type": "image", "items": [{"id": "item-1", "caption": "sticker"}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message_id": 2})))
        .expect(1)
        .mount(&t.crm_server)
        .await;

    let update = serde_json::json!({
        "update_id": 2,
        "message": {
            "message_id": 78,
            "from": {"id": 42, "first_name": "Ann", "username": "ann", "language_code": "en"},
            "chat": {"id": 100, "type": "private"},
            "date": 1700000000,
            "sticker": {"file_id": "sticker-1"}
        }
    });

    let response = post_json(&t.app, "/telegram/123:ABC", update).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_bot_token_answers_ok_silently() {
    let t = test_app().await;

    let response = post_json(
        &t.app,
        "/telegram/999:UNKNOWN",
        text_update_json(77, 42, 100, "hi"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(t.crm_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_delivery_is_not_an_error() {
    let t = test_app().await;
    mount_empty_profile(&t.telegram_server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/messages"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "errors": ["Message with passed external_id already exists"]
        })))
        .mount(&t.crm_server)
        .await;

    let response = post_json(
        &t.app,
        "/telegram/123:ABC",
        text_update_json(77, 42, 100, "hi"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn crm_product_event_renders_and_reports_native_id() {
    let t = test_app().await;

    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {
                "message_id": 900,
                "chat": {"id": 100, "type": "private"},
                "date": 1700000000
            }
        })))
        .expect(1)
        .mount(&t.telegram_server)
        .await;

    let response = post_json(
        &t.app,
        "/webhook/",
        serde_json::json!({
            "type": "message_sent",
            "client_id": "client-1",
            "data": {
                "channel_id": 7,
                "external_chat_id": "100",
                "type": "product",
                "product": {
                    "name": "Widget",
                    "url": "https://shop.example.com/widget",
                    "cost": {"value": 100.0, "currency": "usd"}
                }
            }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["external_message_id"], "900");

    let sent = t.telegram_server.received_requests().await.unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&sent[0].body).unwrap();
    let text = payload["text"].as_str().unwrap();
    assert!(text.contains("Widget"));
    assert!(text.contains("Cost: 100 $"));
    assert!(!text.to_lowercase().contains("usd"));
}

#[tokio::test]
async fn crm_delete_event_deletes_native_message() {
    let t = test_app().await;

    Mock::given(method("POST"))
        .and(path("/bot123:ABC/deleteMessage"))
        .and(body_partial_json(serde_json::json!({
            "chat_id": 100, "message_id": 900
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"ok": true, "result": true})),
        )
        .expect(1)
        .mount(&t.telegram_server)
        .await;

    let response = post_json(
        &t.app,
        "/webhook/",
        serde_json::json!({
            "type": "message_deleted",
            "client_id": "client-1",
            "data": {
                "channel_id": 7,
                "external_chat_id": "100",
                "external_message_id": "900"
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn add_bot_with_existing_token_is_rejected_before_any_upstream_call() {
    let t = test_app().await;

    let response = post_json(
        &t.app,
        "/add-bot",
        serde_json::json!({
            "client_id": "client-1",
            "token": t.bot.token
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "A bot with this token is already registered");

    assert!(t.telegram_server.received_requests().await.unwrap().is_empty());
    assert!(t.crm_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn add_bot_registers_and_returns_channel() {
    let t = test_app().await;

    Mock::given(method("POST"))
        .and(path("/bot555:NEW/getMe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {"id": 555, "first_name": "New", "username": "new_bot"}
        })))
        .mount(&t.telegram_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/bot555:NEW/setWebhook"))
        .and(body_partial_json(serde_json::json!({
            "url": "https://bridge.test/telegram/555:NEW"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"ok": true, "result": true})),
        )
        .expect(1)
        .mount(&t.telegram_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/channels"))
        .and(body_partial_json(serde_json::json!({"name": "@new_bot"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({"channel_id": 31})),
        )
        .expect(1)
        .mount(&t.crm_server)
        .await;

    let response = post_json(
        &t.app,
        "/add-bot",
        serde_json::json!({
            "client_id": "client-1",
            "token": "555:NEW",
            "lang": "es"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["channel_id"], 31);
    assert_eq!(body["name"], "new_bot");
    assert_eq!(body["lang"], "es");
}

#[tokio::test]
async fn add_bot_without_token_is_rejected() {
    let t = test_app().await;

    let response = post_json(
        &t.app,
        "/add-bot",
        serde_json::json!({"client_id": "client-1", "token": ""}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Bot token is required");
}

#[tokio::test]
async fn activity_callback_deactivates_connection_and_silences_webhooks() {
    let t = test_app().await;

    let form = "clientId=client-1&activity=%7B%22active%22%3Afalse%2C%22freeze%22%3Afalse%7D";
    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/actions/activity")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let conn = queries::connections::get_by_client_id(&t.state.bridge.db, "client-1")
        .await
        .unwrap()
        .unwrap();
    assert!(!conn.active);

    // Updates for bots of an inactive connection are absorbed silently.
    let response = post_json(
        &t.app,
        "/telegram/123:ABC",
        text_update_json(79, 42, 100, "hi"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(t.crm_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn settings_endpoint_lists_bots_without_secrets() {
    let t = test_app().await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/settings/client-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["connection"]["client_id"], "client-1");
    assert!(body["connection"].get("api_key").is_none());
    assert_eq!(body["bots"][0]["channel_id"], 7);
}

#[tokio::test]
async fn create_connection_registers_integration_and_persists_gateway() {
    let t = test_app().await;
    let crm = &t.crm_server;

    Mock::given(method("GET"))
        .and(path("/api/credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "credentials": [
                "/api/integration-modules/{code}",
                "/api/integration-modules/{code}/edit"
            ]
        })))
        .mount(crm)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/integration-modules/telegram/edit"))
        .and(body_partial_json(serde_json::json!({
            "client_id": "generated-client-id",
            "integrations": {"mg_transport": {"webhook_url": "https://bridge.test/webhook/"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "info": {"mg_transport": {"endpoint_url": "https://mg.example.com", "token": "issued-token"}}
        })))
        .expect(1)
        .mount(crm)
        .await;

    // Move the seeded connection aside so the duplicate-URL check passes.
    queries::connections::set_activity(
        &t.state.bridge.db,
        "client-1",
        false,
        Some("https://elsewhere.example.com"),
    )
    .await
    .unwrap();
    let api_url = crm.uri();

    let response = post_json(
        &t.app,
        "/create",
        serde_json::json!({"api_url": api_url, "api_key": "key"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["url"], "/settings/generated-client-id");

    let created = queries::connections::get_by_client_id(&t.state.bridge.db, "generated-client-id")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.mg_url, "https://mg.example.com");
    assert_eq!(created.mg_token, "issued-token");
    assert!(created.active);
}

#[tokio::test]
async fn malformed_update_json_is_a_client_error() {
    let t = test_app().await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/telegram/123:ABC")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}
