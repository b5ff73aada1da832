// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Gramgate transport bridge.
//!
//! Gramgate registers Telegram bots as messaging channels inside a CRM's
//! unified inbox and relays messages bidirectionally between the two
//! platforms. This crate provides the error type, the persisted domain
//! models, the token generator and the collaborator traits shared by the
//! rest of the workspace.

pub mod error;
pub mod token;
pub mod traits;
pub mod types;

pub use error::GramgateError;
pub use token::{SequencedTokenGenerator, TokenGenerator};
pub use traits::AvatarStore;
pub use types::{Bot, Connection, TgUser};
