// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook handlers for both directions of the bridge.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gramgate_core::GramgateError;
use gramgate_crm::types::WebhookRequest;
use gramgate_relay::{OutboundOutcome, inbound, outbound};
use gramgate_storage::queries;
use gramgate_telegram::Update;
use tracing::{error, info};

use crate::server::AppState;

/// `POST /telegram/{token}` — one Telegram update.
///
/// Unknown bots and inactive connections answer 200 with an empty body:
/// Telegram would otherwise retry (or eventually disable) the webhook,
/// and neither condition is repairable by retrying. Attachment failures
/// answer 400; only genuinely retryable faults answer 500.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(update): Json<Update>,
) -> Response {
    let bot = match queries::bots::get_by_token(&state.bridge.db, &token).await {
        Ok(Some(bot)) => bot,
        Ok(None) => {
            error!("update for unknown bot token");
            return ok_empty();
        }
        Err(e) => return internal(e),
    };

    let conn = match queries::connections::get_by_id(&state.bridge.db, bot.connection_id).await {
        Ok(Some(conn)) if conn.active => conn,
        Ok(_) => {
            error!(bot = bot.id, "update for inactive or missing connection");
            return ok_empty();
        }
        Err(e) => return internal(e),
    };

    match inbound::process_update(&state.bridge, &conn, &bot, &update).await {
        Ok(outcome) => {
            info!(bot = bot.id, ?outcome, "telegram update handled");
            ok_empty()
        }
        Err(GramgateError::Media(e)) => {
            error!(bot = bot.id, error = %e, "attachment processing failed");
            StatusCode::BAD_REQUEST.into_response()
        }
        Err(e) => internal(e),
    }
}

/// `POST /webhook/` — one CRM message event.
///
/// `message_sent` answers with the Telegram-native message ID so the CRM
/// can address later edits and deletes. Telegram-side failures are client
/// errors from the CRM's point of view.
pub async fn crm_webhook(
    State(state): State<AppState>,
    Json(request): Json<WebhookRequest>,
) -> Response {
    let conn = match queries::connections::get_by_client_id(&state.bridge.db, &request.client_id)
        .await
    {
        Ok(Some(conn)) if conn.active => conn,
        Ok(_) => {
            error!(client_id = %request.client_id, "event for unknown or inactive connection");
            return StatusCode::BAD_REQUEST.into_response();
        }
        Err(e) => return internal(e),
    };

    match outbound::process_webhook(&state.bridge, &conn, &request).await {
        Ok(OutboundOutcome::Sent {
            external_message_id,
        }) => (
            StatusCode::OK,
            Json(serde_json::json!({ "external_message_id": external_message_id })),
        )
            .into_response(),
        Ok(_) => ok_empty(),
        Err(
            e @ (GramgateError::Validation(_)
            | GramgateError::NotFound { .. }
            | GramgateError::Media(_)
            | GramgateError::Telegram { .. }),
        ) => {
            error!(client_id = %request.client_id, error = %e, "crm event rejected");
            StatusCode::BAD_REQUEST.into_response()
        }
        Err(e) => internal(e),
    }
}

fn ok_empty() -> Response {
    (StatusCode::OK, Json(serde_json::json!({}))).into_response()
}

fn internal(e: GramgateError) -> Response {
    error!(error = %e, "webhook processing failed");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
