// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin JSON API: account linking, bot management, activity callback.

use std::collections::BTreeMap;

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use gramgate_core::types::now_rfc3339;
use gramgate_core::{Bot, Connection};
use gramgate_crm::account::missing_credentials;
use gramgate_crm::settings_fingerprint;
use gramgate_crm::types::{IntegrationModule, Integrations, MgTransport};
use gramgate_relay::reconcile;
use gramgate_storage::queries;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::handlers::{ErrorBody, error_response, lang_from_headers};
use crate::server::AppState;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct ConnectionRequest {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct AddBotRequest {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteBotRequest {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct SetLangRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub lang: String,
}

/// Activity callback form, field names fixed by the CRM.
#[derive(Debug, Deserialize)]
pub struct ActivityForm {
    #[serde(rename = "clientId", default)]
    pub client_id: String,
    #[serde(default)]
    pub activity: String,
    #[serde(rename = "systemUrl", default)]
    pub system_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActivityPayload {
    #[serde(default)]
    active: bool,
    #[serde(default)]
    freeze: bool,
}

#[derive(Debug, Serialize)]
struct BotSummary {
    id: i64,
    token: String,
    name: String,
    channel_id: u64,
    lang: String,
}

impl From<Bot> for BotSummary {
    fn from(bot: Bot) -> Self {
        Self {
            id: bot.id,
            token: bot.token,
            name: bot.name,
            channel_id: bot.channel_id,
            lang: bot.lang,
        }
    }
}

fn bad_request(state: &AppState, lang: &str, key: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: state.bridge.locales.localize(lang, key),
        }),
    )
        .into_response()
}

/// Checks the tenant's API key against the CRM account API: the key must
/// be accepted and carry the integration-module scopes.
async fn verify_crm_access(
    state: &AppState,
    lang: &str,
    api_url: &str,
    api_key: &str,
) -> Result<(), Response> {
    let probe = Connection {
        api_url: api_url.to_string(),
        api_key: api_key.to_string(),
        ..Default::default()
    };
    let account = state.bridge.account(&probe);

    let credentials = account.get_credentials().await.map_err(|e| {
        error!(api_url, error = %e, "credentials check failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: state.bridge.locales.localize(lang, "not_found_account"),
            }),
        )
            .into_response()
    })?;

    if !credentials.success {
        return Err(bad_request(state, lang, "incorrect_url_key"));
    }

    let missing = missing_credentials(&credentials.credentials);
    if !missing.is_empty() {
        let error = state.bridge.locales.localize_with(
            lang,
            "missing_credentials",
            &[("credentials", missing.join(", "))],
        );
        return Err((StatusCode::BAD_REQUEST, Json(ErrorBody { error })).into_response());
    }

    Ok(())
}

fn integration_module(state: &AppState, client_id: &str) -> IntegrationModule {
    let config = &state.bridge.config;
    let base = state.bridge.public_base_url();
    IntegrationModule {
        code: config.transport.code.clone(),
        integration_code: config.transport.code.clone(),
        active: true,
        name: config.transport.name.clone(),
        client_id: client_id.to_string(),
        logo: format!("{base}{}", config.transport.logo_path),
        base_url: base.clone(),
        account_url: format!("{base}/settings/{client_id}"),
        actions: BTreeMap::from([("activity".to_string(), "/actions/activity".to_string())]),
        integrations: Integrations {
            mg_transport: MgTransport {
                webhook_url: format!("{base}/webhook/"),
            },
        },
    }
}

/// `POST /create` — link a new CRM account: verify credentials, register
/// the integration module, store the issued gateway credentials.
pub async fn create_connection(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ConnectionRequest>,
) -> Response {
    let lang = lang_from_headers(&state, &headers);

    let api_url = validate::normalize_url(&request.api_url);
    if api_url.is_empty() || request.api_key.is_empty() {
        return bad_request(&state, &lang, "missing_url_key");
    }
    if !validate::is_valid_crm_url(&state.bridge.config.crm.url_pattern, &api_url) {
        return bad_request(&state, &lang, "incorrect_url");
    }

    match queries::connections::get_by_api_url(&state.bridge.db, &api_url).await {
        Ok(Some(_)) => return bad_request(&state, &lang, "connection_already_created"),
        Ok(None) => {}
        Err(e) => return error_response(&state, &lang, &e).into_response(),
    }

    if let Err(response) = verify_crm_access(&state, &lang, &api_url, &request.api_key).await {
        return response;
    }

    let client_id = state.tokens.generate();
    let module = integration_module(&state, &client_id);
    let account = state.bridge.account(&Connection {
        api_url: api_url.clone(),
        api_key: request.api_key.clone(),
        ..Default::default()
    });

    let (edit, status) = match account.edit_integration_module(&module).await {
        Ok(result) => result,
        Err(e) => {
            error!(api_url, error = %e, "integration registration failed");
            return error_response(&state, &lang, &e).into_response();
        }
    };

    if status == StatusCode::PAYMENT_REQUIRED.as_u16() {
        return bad_request(&state, &lang, "error_payment_mg");
    }
    if status >= 400 || !edit.success {
        warn!(api_url, status, error = ?edit.error_msg, "integration registration rejected");
        return bad_request(&state, &lang, "error_activity_mg");
    }

    let Some(gateway) = edit.info.mg_transport else {
        error!(api_url, "integration response carried no gateway credentials");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: state.bridge.locales.localize(&lang, "error_creating_connection"),
            }),
        )
            .into_response();
    };

    let conn = Connection {
        client_id: client_id.clone(),
        api_url,
        api_key: request.api_key,
        mg_url: gateway.endpoint_url,
        mg_token: gateway.token,
        active: true,
        created_at: now_rfc3339(),
        updated_at: now_rfc3339(),
        ..Default::default()
    };

    if let Err(e) = queries::connections::create_connection(&state.bridge.db, &conn).await {
        return error_response(&state, &lang, &e).into_response();
    }

    info!(client_id = %conn.client_id, "connection created");
    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "url": format!("/settings/{client_id}"),
            "message": state.bridge.locales.localize(&lang, "successful"),
        })),
    )
        .into_response()
}

/// `POST /save` — re-validate and update an existing connection.
pub async fn save_connection(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ConnectionRequest>,
) -> Response {
    let lang = lang_from_headers(&state, &headers);

    let Some(client_id) = request.client_id.as_deref().filter(|c| !c.is_empty()) else {
        return bad_request(&state, &lang, "wrong_data");
    };

    let api_url = validate::normalize_url(&request.api_url);
    if api_url.is_empty() || request.api_key.is_empty() {
        return bad_request(&state, &lang, "missing_url_key");
    }
    if !validate::is_valid_crm_url(&state.bridge.config.crm.url_pattern, &api_url) {
        return bad_request(&state, &lang, "incorrect_url");
    }

    let mut conn = match queries::connections::get_by_client_id(&state.bridge.db, client_id).await {
        Ok(Some(conn)) => conn,
        Ok(None) => return bad_request(&state, &lang, "not_found_account"),
        Err(e) => return error_response(&state, &lang, &e).into_response(),
    };

    if let Err(response) = verify_crm_access(&state, &lang, &api_url, &request.api_key).await {
        return response;
    }

    conn.api_url = api_url;
    conn.api_key = request.api_key;
    if let Err(e) = queries::connections::update_by_client_id(&state.bridge.db, &conn).await {
        return error_response(&state, &lang, &e).into_response();
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": state.bridge.locales.localize(&lang, "successful"),
        })),
    )
        .into_response()
}

/// `GET /settings/{uid}` — a connection and its bots, as JSON. Secrets
/// stay server-side.
pub async fn get_settings(State(state): State<AppState>, Path(uid): Path<String>) -> Response {
    let conn = match queries::connections::get_by_client_id(&state.bridge.db, &uid).await {
        Ok(Some(conn)) => conn,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(e) => return error_response(&state, "en", &e).into_response(),
    };

    let bots = match queries::bots::list_by_connection(&state.bridge.db, conn.id).await {
        Ok(bots) => bots,
        Err(e) => return error_response(&state, "en", &e).into_response(),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "connection": {
                "client_id": conn.client_id,
                "api_url": conn.api_url,
                "active": conn.active,
            },
            "bots": bots.into_iter().map(BotSummary::from).collect::<Vec<_>>(),
            "languages": reconcile::BOT_LANGS,
        })),
    )
        .into_response()
}

/// `POST /add-bot` — register a bot for a connection.
pub async fn add_bot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AddBotRequest>,
) -> Response {
    let lang = lang_from_headers(&state, &headers);

    if request.token.is_empty() {
        return bad_request(&state, &lang, "no_bot_token");
    }

    let bot_lang = request.lang.unwrap_or_else(|| "en".to_string());
    if !reconcile::BOT_LANGS.contains(&bot_lang.as_str()) {
        return bad_request(&state, &lang, "incorrect_lang");
    }

    let conn = match queries::connections::get_by_client_id(&state.bridge.db, &request.client_id)
        .await
    {
        Ok(Some(conn)) => conn,
        Ok(None) => return bad_request(&state, &lang, "not_found_account"),
        Err(e) => return error_response(&state, &lang, &e).into_response(),
    };

    match reconcile::register_bot(&state.bridge, &conn, &request.token, &bot_lang).await {
        Ok(bot) => (StatusCode::CREATED, Json(BotSummary::from(bot))).into_response(),
        Err(e) => error_response(&state, &lang, &e).into_response(),
    }
}

/// `POST /delete-bot` — deactivate the CRM channel, then hard-delete the
/// bot.
pub async fn delete_bot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<DeleteBotRequest>,
) -> Response {
    let lang = lang_from_headers(&state, &headers);

    if request.token.is_empty() {
        return bad_request(&state, &lang, "no_bot_token");
    }

    let conn = match queries::connections::get_by_client_id(&state.bridge.db, &request.client_id)
        .await
    {
        Ok(Some(conn)) => conn,
        Ok(None) => return bad_request(&state, &lang, "not_found_account"),
        Err(e) => return error_response(&state, &lang, &e).into_response(),
    };

    match reconcile::deregister_bot(&state.bridge, &conn, &request.token).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({}))).into_response(),
        Err(e) => error_response(&state, &lang, &e).into_response(),
    }
}

/// `POST /set-lang` — switch a bot's caption language.
pub async fn set_bot_lang(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SetLangRequest>,
) -> Response {
    let lang = lang_from_headers(&state, &headers);

    if request.token.is_empty() {
        return bad_request(&state, &lang, "no_bot_token");
    }
    if !reconcile::BOT_LANGS.contains(&request.lang.as_str()) {
        return bad_request(&state, &lang, "incorrect_lang");
    }

    match queries::bots::get_by_token(&state.bridge.db, &request.token).await {
        Ok(Some(_)) => {}
        Ok(None) => return bad_request(&state, &lang, "wrong_data"),
        Err(e) => return error_response(&state, &lang, &e).into_response(),
    }

    match queries::bots::update_lang(&state.bridge.db, &request.token, &request.lang).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({}))).into_response(),
        Err(e) => error_response(&state, &lang, &e).into_response(),
    }
}

/// `POST /actions/activity` — the CRM's integration activity callback.
///
/// Freezing or disabling the integration deactivates the connection (the
/// records stay); re-enabling reactivates it and re-syncs the channel
/// settings for its bots.
pub async fn activity(State(state): State<AppState>, Form(form): Form<ActivityForm>) -> Response {
    let failure = || {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"success": false, "error": "Wrong data"})),
        )
            .into_response()
    };

    let conn = match queries::connections::get_by_client_id(&state.bridge.db, &form.client_id)
        .await
    {
        Ok(Some(conn)) => conn,
        _ => return failure(),
    };

    let Ok(payload) = serde_json::from_str::<ActivityPayload>(&form.activity) else {
        return failure();
    };

    let active = payload.active && !payload.freeze;
    let system_url = form.system_url.as_deref().filter(|u| !u.is_empty());

    if let Err(e) =
        queries::connections::set_activity(&state.bridge.db, &conn.client_id, active, system_url)
            .await
    {
        error!(client_id = %conn.client_id, error = %e, "activity update failed");
        return failure();
    }

    if active {
        match settings_fingerprint() {
            Ok(fingerprint) => {
                if let Ok(Some(updated)) =
                    queries::connections::get_by_client_id(&state.bridge.db, &conn.client_id).await
                    && let Err(e) =
                        reconcile::sync_connection(&state.bridge, &updated, &fingerprint).await
                {
                    error!(client_id = %conn.client_id, error = %e, "bot re-sync failed");
                }
            }
            Err(e) => error!(error = %e, "settings fingerprint failed"),
        }
    }

    info!(client_id = %conn.client_id, active, "activity callback handled");
    (StatusCode::OK, Json(serde_json::json!({"success": true}))).into_response()
}
