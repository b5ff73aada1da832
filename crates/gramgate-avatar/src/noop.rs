// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback avatar store for deployments without a bucket.

use async_trait::async_trait;
use gramgate_core::{AvatarStore, GramgateError};
use tracing::debug;

/// Passes the source URL through unchanged.
///
/// Telegram download URLs expire after a while, so avatars served this
/// way eventually go stale; configuring a bucket is the durable option.
#[derive(Debug, Clone, Default)]
pub struct PassthroughAvatarStore;

#[async_trait]
impl AvatarStore for PassthroughAvatarStore {
    async fn upload(&self, source_url: &str) -> Result<String, GramgateError> {
        debug!("avatar re-hosting disabled, passing source url through");
        Ok(source_url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passthrough_returns_source_url() {
        let store = PassthroughAvatarStore;
        let url = store.upload("https://example.com/a.jpg").await.unwrap();
        assert_eq!(url, "https://example.com/a.jpg");
    }
}
