// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram Bot API client for the Gramgate transport bridge.
//!
//! The bridge serves many bots at once, each addressed by its own token
//! carried in the webhook path, so the client is a thin per-token wrapper
//! over the raw Bot API rather than a long-polling dispatcher. Provides
//! the update schema, the send/edit/delete and file methods the relay
//! uses, and legacy-Markdown escaping for outbound text.

pub mod client;
pub mod markdown;
pub mod types;

pub use client::TelegramClient;
pub use markdown::escape_markdown;
pub use types::{AttachmentKind, Message, Update};
