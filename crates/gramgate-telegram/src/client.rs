// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Telegram Bot API.
//!
//! One [`TelegramClient`] wraps one bot token; the bridge constructs them
//! per request from the shared `reqwest::Client`, so connection pooling is
//! shared across all bots while addressing stays per token.

use gramgate_core::GramgateError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{ApiResponse, FileInfo, Message, User, UserProfilePhotos};

/// Client for one bot's slice of the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

/// Body for `sendMessage`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
}

/// One entry of a `sendMediaGroup` body.
#[derive(Debug, Clone, Serialize)]
pub struct InputMediaPhoto {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// URL or file identifier Telegram should fetch the photo from.
    pub media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl InputMediaPhoto {
    pub fn new(media: String, caption: Option<String>) -> Self {
        Self {
            kind: "photo",
            media,
            caption,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct SendPhotoRequest {
    chat_id: i64,
    photo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct SendMediaGroupRequest {
    chat_id: i64,
    media: Vec<InputMediaPhoto>,
}

#[derive(Debug, Clone, Serialize)]
struct EditMessageTextRequest {
    chat_id: i64,
    message_id: i64,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<String>,
}

impl TelegramClient {
    /// Creates a client for `token` against `base_url`
    /// (`https://api.telegram.org` outside tests).
    pub fn new(http: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token)
    }

    /// Direct download URL for a file path returned by `getFile`.
    pub fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{file_path}", self.base_url, self.token)
    }

    async fn call<T, B>(&self, method: &str, body: &B) -> Result<T, GramgateError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| GramgateError::Telegram {
                message: format!("{method} request failed: {e}"),
                status: None,
            })?;

        self.decode(method, response).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        method: &str,
        response: reqwest::Response,
    ) -> Result<T, GramgateError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GramgateError::Telegram {
                message: format!("{method} response read failed: {e}"),
                status: Some(status.as_u16()),
            })?;

        let envelope: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|e| GramgateError::Telegram {
                message: format!("{method} returned unparsable body: {e}"),
                status: Some(status.as_u16()),
            })?;

        debug!(method, status = status.as_u16(), ok = envelope.ok, "telegram api call");

        if !envelope.ok {
            return Err(GramgateError::Telegram {
                message: format!(
                    "{method} failed: {}",
                    envelope.description.unwrap_or_else(|| "no description".into())
                ),
                status: envelope.error_code.map(|c| c as u16),
            });
        }

        envelope.result.ok_or_else(|| GramgateError::Telegram {
            message: format!("{method} returned ok without a result"),
            status: Some(status.as_u16()),
        })
    }

    /// `getMe` — authenticates the token and returns the bot's identity.
    pub async fn get_me(&self) -> Result<User, GramgateError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// `setWebhook` — points the bot's webhook at `url`.
    pub async fn set_webhook(&self, url: &str) -> Result<bool, GramgateError> {
        self.call("setWebhook", &serde_json::json!({ "url": url })).await
    }

    /// `sendMessage`.
    pub async fn send_message(&self, req: &SendMessageRequest) -> Result<Message, GramgateError> {
        self.call("sendMessage", req).await
    }

    /// `editMessageText` keyed by the native chat and message IDs.
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<Message, GramgateError> {
        self.call(
            "editMessageText",
            &EditMessageTextRequest {
                chat_id,
                message_id,
                text: text.to_string(),
                parse_mode: parse_mode.map(|m| m.to_string()),
            },
        )
        .await
    }

    /// `deleteMessage`.
    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<bool, GramgateError> {
        self.call(
            "deleteMessage",
            &serde_json::json!({ "chat_id": chat_id, "message_id": message_id }),
        )
        .await
    }

    /// `sendPhoto` with a URL Telegram fetches server-side.
    pub async fn send_photo_url(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: Option<&str>,
    ) -> Result<Message, GramgateError> {
        self.call(
            "sendPhoto",
            &SendPhotoRequest {
                chat_id,
                photo: photo_url.to_string(),
                caption: caption.map(|c| c.to_string()),
            },
        )
        .await
    }

    /// `sendMediaGroup` with photo items fetched by URL.
    pub async fn send_media_group(
        &self,
        chat_id: i64,
        media: Vec<InputMediaPhoto>,
    ) -> Result<Vec<Message>, GramgateError> {
        self.call("sendMediaGroup", &SendMediaGroupRequest { chat_id, media })
            .await
    }

    /// `sendDocument` as a multipart upload streamed from `body`.
    ///
    /// `length` is the upstream-reported file size; Telegram requires the
    /// part length up front for streamed uploads.
    pub async fn send_document_stream(
        &self,
        chat_id: i64,
        file_name: &str,
        length: u64,
        body: reqwest::Body,
    ) -> Result<Message, GramgateError> {
        let part = reqwest::multipart::Part::stream_with_length(body, length)
            .file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("document", part);

        let response = self
            .http
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| GramgateError::Telegram {
                message: format!("sendDocument request failed: {e}"),
                status: None,
            })?;

        self.decode("sendDocument", response).await
    }

    /// `getFile` — resolves a file ID into a downloadable path.
    pub async fn get_file(&self, file_id: &str) -> Result<FileInfo, GramgateError> {
        self.call("getFile", &serde_json::json!({ "file_id": file_id }))
            .await
    }

    /// `getFile` plus URL construction: the direct download URL for a
    /// file ID, or `None` when Telegram reports no path.
    pub async fn get_file_direct_url(&self, file_id: &str) -> Result<Option<String>, GramgateError> {
        let info = self.get_file(file_id).await?;
        Ok(info.file_path.map(|path| self.file_url(&path)))
    }

    /// `getUserProfilePhotos` limited to the most recent photo.
    pub async fn get_user_profile_photos(
        &self,
        user_id: i64,
    ) -> Result<UserProfilePhotos, GramgateError> {
        self.call(
            "getUserProfilePhotos",
            &serde_json::json!({ "user_id": user_id, "limit": 1 }),
        )
        .await
    }
}
