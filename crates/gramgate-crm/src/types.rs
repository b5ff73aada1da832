// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the CRM account and message-gateway APIs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// --- Channel capability descriptor ---

/// Per-feature support level advertised for a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelFeature {
    #[default]
    None,
    Receive,
    Send,
    Both,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub delivered: ChannelFeature,
    pub read: ChannelFeature,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSettingsText {
    pub creating: ChannelFeature,
    pub editing: ChannelFeature,
    pub quoting: ChannelFeature,
    pub deleting: ChannelFeature,
    pub max_chars_count: u32,
}

/// Product and order references share one shape: receive-only content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSettingsContent {
    pub creating: ChannelFeature,
    pub editing: ChannelFeature,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSettingsFiles {
    pub creating: ChannelFeature,
    pub editing: ChannelFeature,
    pub quoting: ChannelFeature,
    pub deleting: ChannelFeature,
    /// Maximum attachment count per message.
    pub max: u32,
}

/// Capability declaration sent to the CRM on channel create/update.
///
/// Field order is the serialization order; the settings fingerprint hashes
/// this structure, so reordering fields changes the fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSettings {
    pub spam_allowed: bool,
    pub status: ChannelStatus,
    pub text: ChannelSettingsText,
    pub product: ChannelSettingsContent,
    pub order: ChannelSettingsContent,
    pub file: ChannelSettingsFiles,
    pub image: ChannelSettingsFiles,
}

/// A channel registration payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub settings: ChannelSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelResponse {
    pub channel_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelListItem {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
}

// --- Messages ---

/// Originator marker for inbound sends. The bridge only ever relays
/// customer-authored messages into the CRM.
pub const ORIGINATOR_CUSTOMER: &str = "customer";

pub const MSG_TYPE_TEXT: &str = "text";
pub const MSG_TYPE_IMAGE: &str = "image";
pub const MSG_TYPE_FILE: &str = "file";
pub const MSG_TYPE_AUDIO: &str = "audio";
pub const MSG_TYPE_PRODUCT: &str = "product";
pub const MSG_TYPE_ORDER: &str = "order";

/// An uploaded attachment reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub caption: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessage {
    /// Telegram's native message ID, stringified; the CRM dedupes on it.
    pub external_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    pub external_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub nickname: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub avatar: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quote {
    pub external_id: String,
}

/// Full inbound-send payload (chat → CRM).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendData {
    pub message: SendMessage,
    pub originator: String,
    pub customer: Customer,
    pub channel: u64,
    pub external_chat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditMessage {
    pub external_id: String,
    pub text: String,
}

/// Edit payload keyed by the same external-ID convention as sends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditMessageRequest {
    pub message: EditMessage,
    pub channel: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message_id: u64,
}

// --- Files ---

#[derive(Debug, Clone, Deserialize)]
pub struct UploadFileResponse {
    pub id: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// A CRM-hosted file resolved through the file API.
#[derive(Debug, Clone, Deserialize)]
pub struct CrmFile {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
}

// --- CRM webhook (CRM → bridge) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    MessageSent,
    MessageUpdated,
    MessageDeleted,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cost {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quantity {
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub cost: Option<Cost>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub price: Option<Cost>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Cost>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentStatus {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: Option<Cost>,
    #[serde(default)]
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderData {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub delivery: Option<Delivery>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub cost: Option<Cost>,
}

/// A file item referenced by an image or file event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileItem {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Payload of one CRM webhook event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub channel_id: u64,
    #[serde(default)]
    pub external_chat_id: String,
    #[serde(default)]
    pub external_message_id: Option<String>,
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub quote_external_id: Option<String>,
    #[serde(default)]
    pub product: Option<ProductData>,
    #[serde(default)]
    pub order: Option<OrderData>,
    #[serde(default)]
    pub items: Option<Vec<FileItem>>,
}

/// One CRM webhook request. `client_id` identifies the tenant connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRequest {
    #[serde(rename = "type")]
    pub event: WebhookEventType,
    pub client_id: String,
    pub data: WebhookData,
}

// --- Account API ---

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsResponse {
    pub success: bool,
    #[serde(default)]
    pub credentials: Vec<String>,
    #[serde(default)]
    pub error_msg: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MgTransport {
    pub webhook_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Integrations {
    pub mg_transport: MgTransport,
}

/// Integration registration payload sent to the account API.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationModule {
    pub code: String,
    pub integration_code: String,
    pub active: bool,
    pub name: String,
    pub client_id: String,
    pub logo: String,
    pub base_url: String,
    pub account_url: String,
    pub actions: BTreeMap<String, String>,
    pub integrations: Integrations,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MgTransportInfo {
    pub endpoint_url: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntegrationInfo {
    #[serde(default)]
    pub mg_transport: Option<MgTransportInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationEditResponse {
    pub success: bool,
    #[serde(default)]
    pub info: IntegrationInfo,
    #[serde(default)]
    pub error_msg: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_feature_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ChannelFeature::Receive).unwrap(),
            "\"receive\""
        );
        assert_eq!(
            serde_json::to_string(&ChannelFeature::Both).unwrap(),
            "\"both\""
        );
    }

    #[test]
    fn webhook_request_deserializes() {
        let json = r#"{
            "type": "message_sent",
            "client_id": "client-1",
            "data": {
                "channel_id": 7,
                "external_chat_id": "100",
                "type": "text",
                "content": "hello"
            }
        }"#;
        let req: WebhookRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.event, WebhookEventType::MessageSent);
        assert_eq!(req.data.channel_id, 7);
        assert_eq!(req.data.content, "hello");
    }

    #[test]
    fn channel_omits_absent_id_and_name() {
        let channel = Channel {
            id: None,
            kind: "telegram".into(),
            name: None,
            settings: ChannelSettings::default(),
        };
        let json = serde_json::to_string(&channel).unwrap();
        assert!(!json.contains("\"id\""));
        assert!(!json.contains("\"name\""));
    }
}
