// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-user profile cache with TTL-based refresh.
//!
//! Telegram avatar URLs are short-lived, so refreshed avatars are
//! re-hosted through the [`AvatarStore`] collaborator. The refresh fails
//! closed: any network error aborts the whole resolve without touching
//! the cached record, because a stale cache beats a partial one.

use gramgate_core::types::now_rfc3339;
use gramgate_core::{AvatarStore, GramgateError, TgUser};
use gramgate_storage::{Database, queries};
use gramgate_telegram::TelegramClient;
use tracing::debug;

/// Resolves the cached profile of `external_id`, refreshing it from
/// Telegram when missing or older than `refresh_interval_secs`.
///
/// The avatar is re-uploaded only when the platform-reported file
/// identifier changed and a download URL is available; identifier and URL
/// are then updated together. When the platform reports no photo the
/// cached fields stay as they are and only the timestamp advances.
pub async fn resolve_user(
    db: &Database,
    telegram: &TelegramClient,
    avatars: &dyn AvatarStore,
    refresh_interval_secs: u64,
    external_id: i64,
) -> Result<TgUser, GramgateError> {
    let cached = queries::users::get_by_external_id(db, external_id).await?;

    if let Some(user) = &cached
        && !user.expired(refresh_interval_secs)
    {
        return Ok(user.clone());
    }

    let mut user = cached.unwrap_or(TgUser {
        external_id,
        ..Default::default()
    });

    let photos = telegram.get_user_profile_photos(external_id).await?;

    // Most recent photo, largest size variant.
    let photo_id = photos
        .photos
        .first()
        .and_then(|sizes| sizes.last())
        .map(|p| p.file_id.clone());

    if let Some(photo_id) = photo_id {
        let photo_url = telegram.get_file_direct_url(&photo_id).await?;
        if photo_id != user.photo_id
            && let Some(photo_url) = photo_url
        {
            let stored_url = avatars.upload(&photo_url).await?;
            debug!(external_id, photo_id, "avatar refreshed");
            user.photo_id = photo_id;
            user.photo_url = stored_url;
        }
    }

    user.updated_at = now_rfc3339();
    queries::users::upsert(db, &user).await?;
    Ok(user)
}
