// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound relay: Telegram update events into CRM messages.
//!
//! Two independent branches per update: a new-message branch that builds a
//! CRM send (resolving the sender's profile and transcoding attachments),
//! and an edited-message branch that forwards text edits. Decisions not to
//! relay are returned as tagged [`RelayOutcome::Ignored`] values instead
//! of silently falling through.

use gramgate_core::{Bot, Connection, GramgateError};
use gramgate_crm::transport::is_duplicate_external_id;
use gramgate_crm::types::{
    Customer, EditMessage, EditMessageRequest, MSG_TYPE_TEXT, ORIGINATOR_CUSTOMER, Quote,
    SendData, SendMessage,
};
use gramgate_telegram::types::Message as TgMessage;
use gramgate_telegram::Update;
use tracing::{debug, error, warn};

use crate::context::Bridge;
use crate::{media, profile};

/// What the relay did with an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// At least one CRM call was made (or absorbed as a duplicate).
    Delivered,
    /// The update was deliberately not relayed; the reason is for logs
    /// and tests, the webhook still answers 200.
    Ignored(&'static str),
}

/// Processes one Telegram update for an already-resolved bot.
///
/// The caller has verified the bot exists and its connection is active.
pub async fn process_update(
    bridge: &Bridge,
    conn: &Connection,
    bot: &Bot,
    update: &Update,
) -> Result<RelayOutcome, GramgateError> {
    if let Some(msg) = &update.message
        && msg.is_service_event()
    {
        debug!(message_id = msg.message_id, "ignoring service event");
        return Ok(RelayOutcome::Ignored("service event"));
    }

    let mut outcome = RelayOutcome::Ignored("no message payload");

    if let Some(msg) = &update.message {
        outcome = relay_new_message(bridge, conn, bot, msg).await?;
    }

    if let Some(edited) = &update.edited_message {
        let edit_outcome = relay_edited_message(bridge, conn, bot, edited).await?;
        if outcome != RelayOutcome::Delivered {
            outcome = edit_outcome;
        }
    }

    Ok(outcome)
}

async fn relay_new_message(
    bridge: &Bridge,
    conn: &Connection,
    bot: &Bot,
    msg: &TgMessage,
) -> Result<RelayOutcome, GramgateError> {
    let Some(from) = &msg.from else {
        return Ok(RelayOutcome::Ignored("message without sender"));
    };

    let nickname = from
        .username
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| from.first_name.clone());

    let telegram = bridge.telegram(&bot.token);
    let user = profile::resolve_user(
        &bridge.db,
        &telegram,
        bridge.avatars.as_ref(),
        bridge.config.profile.refresh_interval_secs,
        from.id,
    )
    .await?;

    let sender_lang = from.language_code.as_deref().unwrap_or_default();
    // The CRM stores whatever two-letter code the sender reports, even
    // ones the bridge has no catalog for.
    let language = sender_lang.get(..2).unwrap_or_default().to_string();

    let mut send = SendData {
        message: SendMessage {
            external_id: msg.message_id.to_string(),
            kind: MSG_TYPE_TEXT.to_string(),
            text: msg.text.clone().unwrap_or_default(),
            items: None,
            note: None,
        },
        originator: ORIGINATOR_CUSTOMER.to_string(),
        customer: Customer {
            external_id: from.id.to_string(),
            nickname,
            first_name: from.first_name.clone(),
            last_name: from.last_name.clone().unwrap_or_default(),
            avatar: user.photo_url.clone(),
            language,
        },
        channel: bot.channel_id,
        external_chat_id: msg.chat.id.to_string(),
        quote: msg.reply_to_message.as_ref().map(|reply| Quote {
            external_id: reply.message_id.to_string(),
        }),
    };

    let transport = bridge.transport(conn);

    if send.message.text.is_empty() {
        media::attach_inbound(
            &telegram,
            &transport,
            &bridge.http,
            &bridge.locales,
            sender_lang,
            msg,
            &mut send.message,
        )
        .await?;
    }

    match transport.send_message(&send).await {
        Ok(response) => {
            debug!(
                external_id = %send.message.external_id,
                crm_message_id = response.message_id,
                "message relayed to crm"
            );
            Ok(RelayOutcome::Delivered)
        }
        // Quote-related sends fail on edge cases the chat platform keeps
        // retrying; answer OK to stop the storm.
        Err(e) if send.quote.is_some() => {
            warn!(
                external_id = %send.message.external_id,
                error = %e,
                "quoted send failed, absorbing to avoid webhook retries"
            );
            Ok(RelayOutcome::Delivered)
        }
        // Webhook redelivery: the CRM already has this external ID.
        Err(e) if is_duplicate_external_id(&e) => {
            warn!(
                external_id = %send.message.external_id,
                "duplicate external id, treating as delivered"
            );
            Ok(RelayOutcome::Delivered)
        }
        Err(e) => {
            error!(
                external_id = %send.message.external_id,
                error = %e,
                "crm send failed"
            );
            Err(e)
        }
    }
}

async fn relay_edited_message(
    bridge: &Bridge,
    conn: &Connection,
    bot: &Bot,
    edited: &TgMessage,
) -> Result<RelayOutcome, GramgateError> {
    // Only text edits are forwarded. An edit that changed a caption or a
    // media payload carries no text and produces no CRM call; this is an
    // accepted limitation of the protocol mapping.
    let text = match edited.text.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => {
            debug!(message_id = edited.message_id, "ignoring non-text edit");
            return Ok(RelayOutcome::Ignored("non-text edit"));
        }
    };

    let request = EditMessageRequest {
        message: EditMessage {
            external_id: edited.message_id.to_string(),
            text: text.to_string(),
        },
        channel: bot.channel_id,
    };

    let transport = bridge.transport(conn);
    transport.update_message(&request).await.map_err(|e| {
        error!(
            external_id = %request.message.external_id,
            error = %e,
            "crm message update failed"
        );
        e
    })?;

    Ok(RelayOutcome::Delivered)
}
