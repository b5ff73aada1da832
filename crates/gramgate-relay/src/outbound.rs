// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound relay: CRM webhook events into Telegram calls.
//!
//! Dispatches on the event type. For `message_sent` the CRM-side content
//! is rendered into Markdown text or resolved into photo/document
//! uploads; the Telegram-native message ID of the sent message is
//! reported back so the CRM can correlate later edits and deletes.

use gramgate_core::{Connection, GramgateError};
use gramgate_crm::types::{
    MSG_TYPE_FILE, MSG_TYPE_IMAGE, MSG_TYPE_ORDER, MSG_TYPE_PRODUCT, MSG_TYPE_TEXT,
    WebhookEventType, WebhookRequest,
};
use gramgate_storage::queries;
use gramgate_telegram::client::SendMessageRequest;
use gramgate_telegram::escape_markdown;
use tracing::{debug, error};

use crate::context::Bridge;
use crate::{media, render};

const PARSE_MODE_MARKDOWN: &str = "Markdown";

/// Result of one CRM webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundOutcome {
    /// Message sent; carries the Telegram-native ID as the external
    /// message identifier the CRM stores.
    Sent { external_message_id: String },
    Updated,
    Deleted,
}

/// Processes one CRM webhook event for an already-resolved connection.
pub async fn process_webhook(
    bridge: &Bridge,
    conn: &Connection,
    request: &WebhookRequest,
) -> Result<OutboundOutcome, GramgateError> {
    let data = &request.data;

    let bot = queries::bots::get_by_channel(&bridge.db, conn.id, data.channel_id)
        .await?
        .ok_or(GramgateError::NotFound { entity: "bot" })?;

    let chat_id: i64 = data
        .external_chat_id
        .parse()
        .map_err(|_| GramgateError::Validation("wrong_data".into()))?;

    let telegram = bridge.telegram(&bot.token);
    let lang = &bot.lang;

    match request.event {
        WebhookEventType::MessageSent => {
            let transport = bridge.transport(conn);

            // Attachment events go straight out; everything else renders
            // to Markdown text first.
            let body = match data.content_type.as_deref() {
                Some(MSG_TYPE_IMAGE) => {
                    let sent =
                        media::send_photo_event(&transport, &telegram, chat_id, data).await?;
                    return Ok(sent_outcome(sent.message_id));
                }
                Some(MSG_TYPE_FILE) => {
                    let item = data
                        .items
                        .as_deref()
                        .and_then(|items| items.first())
                        .ok_or_else(|| GramgateError::Validation("wrong_data".into()))?;
                    let sent = media::send_document_event(
                        &transport,
                        &telegram,
                        &bridge.http,
                        chat_id,
                        item,
                    )
                    .await?;
                    return Ok(sent_outcome(sent.message_id));
                }
                Some(MSG_TYPE_PRODUCT) => {
                    let product = data
                        .product
                        .as_ref()
                        .ok_or_else(|| GramgateError::Validation("wrong_data".into()))?;
                    render::render_product(&bridge.locales, lang, product)
                }
                Some(MSG_TYPE_ORDER) => {
                    let order = data
                        .order
                        .as_ref()
                        .ok_or_else(|| GramgateError::Validation("wrong_data".into()))?;
                    render::render_order(&bridge.locales, lang, order)
                }
                Some(MSG_TYPE_TEXT) | None => escape_markdown(&data.content),
                Some(other) => {
                    return Err(GramgateError::Validation(format!(
                        "unsupported content type {other}"
                    )));
                }
            };

            let reply_to = match data.quote_external_id.as_deref().filter(|q| !q.is_empty()) {
                Some(quote) => Some(quote.parse::<i64>().map_err(|_| {
                    GramgateError::Validation("wrong_data".into())
                })?),
                None => None,
            };

            let sent = telegram
                .send_message(&SendMessageRequest {
                    chat_id,
                    text: body,
                    parse_mode: Some(PARSE_MODE_MARKDOWN.to_string()),
                    reply_to_message_id: reply_to,
                })
                .await
                .map_err(log_send_error)?;

            debug!(chat_id, message_id = sent.message_id, "crm message sent to telegram");
            Ok(sent_outcome(sent.message_id))
        }

        WebhookEventType::MessageUpdated => {
            // An edit must carry text; the CRM cannot edit attachments.
            if data.content.is_empty() {
                return Err(GramgateError::Validation("wrong_data".into()));
            }
            let message_id = parse_external_message_id(data.external_message_id.as_deref())?;
            telegram
                .edit_message_text(
                    chat_id,
                    message_id,
                    &escape_markdown(&data.content),
                    Some(PARSE_MODE_MARKDOWN),
                )
                .await
                .map_err(log_send_error)?;
            Ok(OutboundOutcome::Updated)
        }

        WebhookEventType::MessageDeleted => {
            let message_id = parse_external_message_id(data.external_message_id.as_deref())?;
            telegram
                .delete_message(chat_id, message_id)
                .await
                .map_err(log_send_error)?;
            Ok(OutboundOutcome::Deleted)
        }
    }
}

fn sent_outcome(message_id: i64) -> OutboundOutcome {
    OutboundOutcome::Sent {
        external_message_id: message_id.to_string(),
    }
}

/// The external message ID the CRM stored is the stringified Telegram
/// message ID reported at send time; parse it back to the native form.
fn parse_external_message_id(raw: Option<&str>) -> Result<i64, GramgateError> {
    raw.and_then(|id| id.parse().ok())
        .ok_or_else(|| GramgateError::Validation("wrong_data".into()))
}

fn log_send_error(e: GramgateError) -> GramgateError {
    error!(error = %e, "telegram call failed");
    e
}
