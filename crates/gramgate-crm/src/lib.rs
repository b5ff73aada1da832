// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRM API clients for the Gramgate transport bridge.
//!
//! Two distinct CRM surfaces are consumed: the **account API** (reached at
//! a tenant's base URL, authenticated by API key) for credential checks
//! and integration registration, and the **message-gateway transport API**
//! (reached at the gateway URL issued during registration, authenticated
//! by gateway token) for channels, messages and files.

pub mod account;
pub mod settings;
pub mod transport;
pub mod types;

pub use account::AccountClient;
pub use settings::{channel_settings, settings_fingerprint};
pub use transport::TransportClient;
