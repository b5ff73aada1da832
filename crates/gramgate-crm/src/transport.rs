// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the CRM message-gateway transport API.
//!
//! One client per connection: the base URL and token are issued by the CRM
//! when the integration is registered.

use gramgate_core::GramgateError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{
    Channel, ChannelListItem, ChannelResponse, CrmFile, EditMessageRequest, MessageResponse,
    SendData, UploadFileResponse,
};

const TOKEN_HEADER: &str = "x-transport-token";

/// Client for one connection's message gateway.
#[derive(Debug, Clone)]
pub struct TransportClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

// The gateway reports errors as {"errors": ["..."]}.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

impl TransportClient {
    pub fn new(http: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        what: &str,
        response: reqwest::Response,
    ) -> Result<T, GramgateError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| GramgateError::Crm {
            message: format!("{what} response read failed: {e}"),
            status: Some(status.as_u16()),
        })?;

        debug!(what, status = status.as_u16(), "crm transport call");

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(err) if !err.errors.is_empty() => err.errors.join("; "),
                _ => body,
            };
            return Err(GramgateError::Crm {
                message: format!("{what} failed: {message}"),
                status: Some(status.as_u16()),
            });
        }

        serde_json::from_str(&body).map_err(|e| GramgateError::Crm {
            message: format!("{what} returned unparsable body: {e}"),
            status: Some(status.as_u16()),
        })
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        what: &str,
        request: reqwest::RequestBuilder,
        body: Option<&B>,
    ) -> Result<reqwest::Response, GramgateError> {
        let request = request.header(TOKEN_HEADER, &self.token);
        let request = match body {
            Some(b) => request.json(b),
            None => request,
        };
        request.send().await.map_err(|e| GramgateError::Crm {
            message: format!("{what} request failed: {e}"),
            status: None,
        })
    }

    /// Register a new channel. The CRM answers with the issued channel ID.
    pub async fn activate_channel(&self, channel: &Channel) -> Result<ChannelResponse, GramgateError> {
        let response = self
            .send("activate channel", self.http.post(self.url("/channels")), Some(channel))
            .await?;
        self.decode("activate channel", response).await
    }

    /// Push updated settings for an existing channel.
    pub async fn update_channel(&self, channel: &Channel) -> Result<ChannelResponse, GramgateError> {
        let id = channel.id.ok_or_else(|| {
            GramgateError::Internal("update_channel requires a channel id".into())
        })?;
        let response = self
            .send(
                "update channel",
                self.http.patch(self.url(&format!("/channels/{id}"))),
                Some(channel),
            )
            .await?;
        self.decode("update channel", response).await
    }

    /// Deactivate a channel.
    pub async fn deactivate_channel(&self, channel_id: u64) -> Result<ChannelResponse, GramgateError> {
        let response = self
            .send::<()>(
                "deactivate channel",
                self.http.delete(self.url(&format!("/channels/{channel_id}"))),
                None,
            )
            .await?;
        self.decode("deactivate channel", response).await
    }

    /// List channels the CRM currently considers active.
    pub async fn list_active_channels(&self) -> Result<Vec<ChannelListItem>, GramgateError> {
        let response = self
            .send::<()>(
                "list channels",
                self.http
                    .get(self.url("/channels"))
                    .query(&[("active", "true")]),
                None,
            )
            .await?;
        self.decode("list channels", response).await
    }

    /// Send a customer message into the CRM inbox.
    pub async fn send_message(&self, data: &SendData) -> Result<MessageResponse, GramgateError> {
        let response = self
            .send("send message", self.http.post(self.url("/messages")), Some(data))
            .await?;
        self.decode("send message", response).await
    }

    /// Update a previously sent message, keyed by external ID.
    pub async fn update_message(
        &self,
        data: &EditMessageRequest,
    ) -> Result<MessageResponse, GramgateError> {
        let response = self
            .send("update message", self.http.patch(self.url("/messages")), Some(data))
            .await?;
        self.decode("update message", response).await
    }

    /// Upload a file the CRM fetches server-side from `url`.
    pub async fn upload_file_by_url(&self, url: &str) -> Result<UploadFileResponse, GramgateError> {
        let body = serde_json::json!({ "url": url });
        let response = self
            .send(
                "upload file by url",
                self.http.post(self.url("/files/upload_by_url")),
                Some(&body),
            )
            .await?;
        self.decode("upload file by url", response).await
    }

    /// Upload raw bytes.
    pub async fn upload_file(&self, bytes: Vec<u8>) -> Result<UploadFileResponse, GramgateError> {
        let response = self
            .http
            .post(self.url("/files/upload"))
            .header(TOKEN_HEADER, &self.token)
            .header("content-type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| GramgateError::Crm {
                message: format!("upload file request failed: {e}"),
                status: None,
            })?;
        self.decode("upload file", response).await
    }

    /// Resolve a CRM-hosted file into a downloadable URL.
    pub async fn get_file(&self, file_id: &str) -> Result<CrmFile, GramgateError> {
        let response = self
            .send::<()>(
                "get file",
                self.http.get(self.url(&format!("/files/{file_id}"))),
                None,
            )
            .await?;
        self.decode("get file", response).await
    }
}

/// Whether an error is the CRM's duplicate-delivery report for an external
/// message ID it has already accepted. Webhook redelivery makes this an
/// expected outcome, not a failure.
pub fn is_duplicate_external_id(err: &GramgateError) -> bool {
    match err {
        GramgateError::Crm {
            message,
            status: Some(400),
        } => message.contains("external_id already exists"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::channel_settings;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> TransportClient {
        TransportClient::new(reqwest::Client::new(), base_url, "mg-token")
    }

    #[tokio::test]
    async fn activate_channel_posts_descriptor_with_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/channels"))
            .and(header("x-transport-token", "mg-token"))
            .and(body_partial_json(serde_json::json!({"type": "telegram"})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"channel_id": 7})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let resp = client
            .activate_channel(&channel_settings(None, Some("demo_bot")))
            .await
            .unwrap();
        assert_eq!(resp.channel_id, 7);
    }

    #[tokio::test]
    async fn list_active_channels_passes_filter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/channels"))
            .and(query_param("active", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 7, "type": "telegram"},
                {"id": 9, "type": "telegram", "name": "@other"}
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let channels = client.list_active_channels().await.unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[1].id, 9);
    }

    #[tokio::test]
    async fn error_body_is_joined_into_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "errors": ["Message with passed external_id already exists"]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.send_message(&SendData::default()).await.unwrap_err();
        assert!(is_duplicate_external_id(&err), "got: {err}");
    }

    #[tokio::test]
    async fn non_duplicate_errors_are_not_absorbed() {
        let err = GramgateError::Crm {
            message: "channel not found".into(),
            status: Some(400),
        };
        assert!(!is_duplicate_external_id(&err));

        let err = GramgateError::Crm {
            message: "external_id already exists".into(),
            status: Some(500),
        };
        assert!(!is_duplicate_external_id(&err));
    }

    #[tokio::test]
    async fn upload_file_sends_raw_bytes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/files/upload"))
            .and(header("content-type", "application/octet-stream"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "file-1"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let resp = client.upload_file(vec![1, 2, 3]).await.unwrap();
        assert_eq!(resp.id, "file-1");
    }
}
