// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! S3-backed [`AvatarStore`] implementation.
//!
//! Telegram's avatar download URLs expire, so the profile cache re-hosts
//! avatars in a bucket and hands the CRM a durable public URL.

mod noop;

pub use noop::PassthroughAvatarStore;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use gramgate_config::model::AvatarConfig;
use gramgate_core::{AvatarStore, GramgateError};
use tracing::debug;

/// Avatar store backed by an S3 bucket with public-read objects.
#[derive(Debug, Clone)]
pub struct S3AvatarStore {
    s3: aws_sdk_s3::Client,
    http: reqwest::Client,
    config: AvatarConfig,
}

impl S3AvatarStore {
    /// Builds the store from configuration, resolving AWS credentials
    /// from the environment.
    pub async fn new(config: AvatarConfig, http: reqwest::Client) -> Self {
        let aws = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;
        Self {
            s3: aws_sdk_s3::Client::new(&aws),
            http,
            config,
        }
    }
}

/// Public URL of a stored object.
///
/// Uses the configured base when set, the bucket's virtual-hosted S3 URL
/// otherwise.
fn object_url(config: &AvatarConfig, key: &str) -> String {
    if config.public_url_base.is_empty() {
        format!(
            "https://{}.s3.{}.amazonaws.com/{key}",
            config.bucket, config.region
        )
    } else {
        format!("{}/{key}", config.public_url_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl AvatarStore for S3AvatarStore {
    async fn upload(&self, source_url: &str) -> Result<String, GramgateError> {
        let response = self
            .http
            .get(source_url)
            .send()
            .await
            .map_err(|e| GramgateError::Media(format!("avatar download failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GramgateError::Media(format!(
                "avatar download of {source_url} returned {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GramgateError::Media(format!("avatar body read failed: {e}")))?;

        let key = format!(
            "{}/{}.jpg",
            self.config.key_prefix.trim_end_matches('/'),
            uuid::Uuid::new_v4()
        );

        self.s3
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .content_type(&self.config.content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|e| GramgateError::Media(format!("avatar upload failed: {e}")))?;

        let url = object_url(&self.config, &key);
        debug!(key, url, "avatar re-hosted");
        Ok(url)
    }
}
