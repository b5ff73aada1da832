// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface of the Gramgate transport bridge.
//!
//! Two webhook endpoints carry the message traffic (`/telegram/{token}`
//! from the chat platform, `/webhook/` from the CRM); the remaining
//! routes form the JSON admin API for connecting accounts and managing
//! bots. The HTML settings forms consuming that API live outside this
//! repository.

pub mod handlers;
pub mod server;
pub mod validate;

pub use server::{AppState, build_router, start_server};
