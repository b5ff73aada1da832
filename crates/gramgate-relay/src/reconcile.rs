// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel lifecycle reconciliation.
//!
//! Two entry points: bot registration (a saga whose only compensable step
//! is the CRM channel activation) and the settings sweep that aligns the
//! CRM's channel list with local bot records. Local records are
//! authoritative; the CRM side is what gets corrected.
//!
//! The sweep is not re-entrant-safe; callers run it sequentially (at
//! startup, before the server accepts traffic).

use gramgate_core::types::now_rfc3339;
use gramgate_core::{Bot, Connection, GramgateError};
use gramgate_crm::{channel_settings, settings_fingerprint};
use gramgate_storage::queries;
use tracing::{error, info, warn};

use crate::context::Bridge;

/// Languages a bot can be switched to.
pub const BOT_LANGS: &[&str] = &["en", "ru", "es"];

// Registration saga step names, for structured logs.
const STEP_VERIFY_TOKEN: &str = "verify_token";
const STEP_ATTACH_WEBHOOK: &str = "attach_webhook";
const STEP_ACTIVATE_CHANNEL: &str = "activate_channel";
const STEP_PERSIST_BOT: &str = "persist_bot";

/// Registers a new bot: verifies the token is unused and authenticates,
/// attaches the webhook, activates a CRM channel and persists the bot.
///
/// Atomic from the caller's perspective: when this returns an error, no
/// bot record exists and the CRM channel (if it was activated) has been
/// deactivated again by the compensation step. The compensation is
/// best-effort; its own failure is only logged.
pub async fn register_bot(
    bridge: &Bridge,
    conn: &Connection,
    token: &str,
    lang: &str,
) -> Result<Bot, GramgateError> {
    if !conn.has_gateway_credentials() {
        return Err(GramgateError::Validation("not_found_account".into()));
    }

    if queries::bots::get_by_token(&bridge.db, token).await?.is_some() {
        return Err(GramgateError::Validation("bot_already_created".into()));
    }

    let telegram = bridge.telegram(token);
    let me = telegram.get_me().await.map_err(|e| {
        warn!(step = STEP_VERIFY_TOKEN, error = %e, "bot token rejected");
        GramgateError::Validation("incorrect_token".into())
    })?;
    let name = me.username.unwrap_or_default();

    let webhook_url = bridge.telegram_webhook_url(token);
    telegram.set_webhook(&webhook_url).await.map_err(|e| {
        warn!(step = STEP_ATTACH_WEBHOOK, error = %e, "webhook attach failed");
        GramgateError::Validation("error_creating_webhook".into())
    })?;

    let transport = bridge.transport(conn);
    let descriptor = channel_settings(None, (!name.is_empty()).then_some(name.as_str()));
    let activated = transport.activate_channel(&descriptor).await.map_err(|e| {
        error!(
            step = STEP_ACTIVATE_CHANNEL,
            api_url = %conn.api_url,
            error = %e,
            "channel activation failed"
        );
        GramgateError::Validation("error_activating_channel".into())
    })?;

    // A fingerprint failure is not worth losing the registration over;
    // the sweep will fill it in later.
    let fingerprint = match settings_fingerprint() {
        Ok(fp) => fp,
        Err(e) => {
            error!(api_url = %conn.api_url, error = %e, "settings fingerprint failed");
            String::new()
        }
    };

    let bot = Bot {
        connection_id: conn.id,
        channel_id: activated.channel_id,
        settings_hash: fingerprint,
        token: token.to_string(),
        name,
        lang: lang.to_string(),
        created_at: now_rfc3339(),
        updated_at: now_rfc3339(),
        ..Default::default()
    };

    match queries::bots::create_bot(&bridge.db, &bot).await {
        Ok(id) => {
            info!(bot = id, channel = bot.channel_id, "bot registered");
            Ok(Bot { id, ..bot })
        }
        Err(e) => {
            error!(step = STEP_PERSIST_BOT, error = %e, "bot persistence failed");
            compensate_channel_activation(&transport, activated.channel_id).await;
            Err(e)
        }
    }
}

/// Compensation for [`register_bot`]'s activation step: tear the CRM
/// channel back down so it does not point at a bot record that was never
/// persisted.
async fn compensate_channel_activation(
    transport: &gramgate_crm::TransportClient,
    channel_id: u64,
) {
    if let Err(e) = transport.deactivate_channel(channel_id).await {
        error!(
            channel = channel_id,
            error = %e,
            "compensating channel deactivation failed; channel is orphaned until the next sweep"
        );
    }
}

/// Deactivates a bot's CRM channel and hard-deletes the bot record.
pub async fn deregister_bot(
    bridge: &Bridge,
    conn: &Connection,
    token: &str,
) -> Result<(), GramgateError> {
    if !conn.has_gateway_credentials() {
        return Err(GramgateError::Validation("not_found_account".into()));
    }

    let bot = queries::bots::get_by_token(&bridge.db, token)
        .await?
        .ok_or(GramgateError::NotFound { entity: "bot" })?;

    let transport = bridge.transport(conn);
    transport.deactivate_channel(bot.channel_id).await.map_err(|e| {
        error!(channel = bot.channel_id, error = %e, "channel deactivation failed");
        GramgateError::Validation("error_deactivating_channel".into())
    })?;

    queries::bots::delete_by_token(&bridge.db, token).await?;
    info!(channel = bot.channel_id, "bot deleted");
    Ok(())
}

/// Settings reconciliation sweep across every active connection.
///
/// Computes the current fingerprint once, pushes updates for bots whose
/// stored fingerprint is stale, and deactivates CRM channels with no
/// local bot. Per-connection failures are logged and do not stop the
/// sweep.
pub async fn sweep(bridge: &Bridge) -> Result<(), GramgateError> {
    let fingerprint = settings_fingerprint()?;

    let connections = queries::connections::list_active(&bridge.db).await?;
    for conn in &connections {
        if let Err(e) = sync_connection(bridge, conn, &fingerprint).await {
            error!(api_url = %conn.api_url, error = %e, "connection sync failed");
        }
    }
    Ok(())
}

/// Reconciles one connection's bots against the CRM channel list.
pub async fn sync_connection(
    bridge: &Bridge,
    conn: &Connection,
    fingerprint: &str,
) -> Result<(), GramgateError> {
    let bots = queries::bots::list_by_connection(&bridge.db, conn.id).await?;
    if bots.is_empty() {
        return Ok(());
    }

    let transport = bridge.transport(conn);
    let mut known_channels = Vec::with_capacity(bots.len());

    for bot in &bots {
        known_channels.push(bot.channel_id);

        if bot.settings_hash == fingerprint {
            continue;
        }

        let descriptor = channel_settings(
            Some(bot.channel_id),
            (!bot.name.is_empty()).then_some(bot.name.as_str()),
        );

        match transport.update_channel(&descriptor).await {
            Ok(_) => {
                if let Err(e) =
                    queries::bots::update_settings_hash(&bridge.db, &bot.token, fingerprint).await
                {
                    error!(channel = bot.channel_id, error = %e, "fingerprint persist failed");
                }
            }
            Err(e) => {
                error!(
                    api_url = %conn.api_url,
                    channel = bot.channel_id,
                    error = %e,
                    "channel settings update failed"
                );
            }
        }
    }

    deactivate_orphans(&transport, &known_channels).await;
    Ok(())
}

/// Deactivates every CRM-side active channel that no local bot accounts
/// for. Local records are the source of truth.
async fn deactivate_orphans(transport: &gramgate_crm::TransportClient, known: &[u64]) {
    let listed = match transport.list_active_channels().await {
        Ok(channels) => channels,
        Err(e) => {
            error!(error = %e, "active channel list failed; skipping orphan cleanup");
            return;
        }
    };

    for channel in listed {
        if known.contains(&channel.id) {
            continue;
        }
        info!(channel = channel.id, "deactivating orphaned channel");
        if let Err(e) = transport.deactivate_channel(channel.id).await {
            error!(channel = channel.id, error = %e, "orphan deactivation failed");
        }
    }
}
