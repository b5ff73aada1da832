// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel capability descriptor and its settings fingerprint.
//!
//! The fingerprint is persisted per bot and compared across runs, so it
//! must be stable: serde_json serializes struct fields in declaration
//! order and the descriptor contains no maps, which keeps the encoding
//! deterministic across process restarts.

use gramgate_core::GramgateError;
use sha1::{Digest, Sha1};

use crate::types::{
    Channel, ChannelFeature, ChannelSettings, ChannelSettingsContent, ChannelSettingsFiles,
    ChannelSettingsText, ChannelStatus,
};

/// Channel type registered with the CRM.
pub const CHANNEL_TYPE: &str = "telegram";

/// Telegram's text message length limit.
pub const MAX_CHARS_COUNT: u32 = 4096;

const MAX_FILES_PER_MESSAGE: u32 = 1;
const MAX_IMAGES_PER_MESSAGE: u32 = 10;

/// Builds the capability declaration for channel create/update calls.
///
/// `channel_id` is set for update calls; `name` is the bot's public
/// username, prefixed with `@`.
pub fn channel_settings(channel_id: Option<u64>, name: Option<&str>) -> Channel {
    Channel {
        id: channel_id,
        kind: CHANNEL_TYPE.to_string(),
        name: name.map(|n| format!("@{n}")),
        settings: ChannelSettings {
            spam_allowed: false,
            status: ChannelStatus {
                delivered: ChannelFeature::Send,
                read: ChannelFeature::None,
            },
            text: ChannelSettingsText {
                creating: ChannelFeature::Both,
                editing: ChannelFeature::Both,
                quoting: ChannelFeature::Both,
                deleting: ChannelFeature::Receive,
                max_chars_count: MAX_CHARS_COUNT,
            },
            product: ChannelSettingsContent {
                creating: ChannelFeature::Receive,
                editing: ChannelFeature::Receive,
            },
            order: ChannelSettingsContent {
                creating: ChannelFeature::Receive,
                editing: ChannelFeature::Receive,
            },
            file: ChannelSettingsFiles {
                creating: ChannelFeature::Both,
                editing: ChannelFeature::Both,
                quoting: ChannelFeature::Both,
                deleting: ChannelFeature::Receive,
                max: MAX_FILES_PER_MESSAGE,
            },
            image: ChannelSettingsFiles {
                creating: ChannelFeature::Both,
                editing: ChannelFeature::Both,
                quoting: ChannelFeature::Both,
                deleting: ChannelFeature::Receive,
                max: MAX_IMAGES_PER_MESSAGE,
            },
        },
    }
}

/// SHA-1 hex digest of the base descriptor (no channel ID, no name).
///
/// This is the version fingerprint stored on each bot and compared during
/// the reconciliation sweep.
pub fn settings_fingerprint() -> Result<String, GramgateError> {
    let encoded = serde_json::to_vec(&channel_settings(None, None))
        .map_err(|e| GramgateError::Internal(format!("settings serialization failed: {e}")))?;
    Ok(hex::encode(Sha1::digest(&encoded)))
}
