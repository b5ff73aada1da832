// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the relay core.

use async_trait::async_trait;

use crate::error::GramgateError;

/// Blob store that re-hosts end-user avatars.
///
/// The relay fetches a short-lived download URL from Telegram; the store
/// downloads the image and returns a durable public URL the CRM can embed
/// in customer profiles.
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Downloads `source_url` and uploads it to durable storage.
    ///
    /// Returns the public URL of the stored object. Any failure leaves no
    /// observable state behind; callers treat it as recoverable.
    async fn upload(&self, source_url: &str) -> Result<String, GramgateError>;
}
