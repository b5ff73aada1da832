// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serde types for the Telegram Bot API update schema.
//!
//! Only the fields the bridge actually reads are modeled; unknown fields
//! are ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Envelope every Bot API method call returns.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

/// A single webhook update: a new message, an edited message, or
/// something the bridge does not relay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub edited_message: Option<Message>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message: Option<Box<Message>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker: Option<Sticker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<Voice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Audio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_chat_members: Option<Vec<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_chat_member: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_chat_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_chat_photo: Option<Vec<PhotoSize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_chat_photo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_chat_created: Option<bool>,
}

impl Message {
    /// True for chat-membership and chat-metadata service events the
    /// bridge ignores entirely: joins, leaves, title/photo changes and
    /// group creation.
    pub fn is_service_event(&self) -> bool {
        self.new_chat_members.is_some()
            || self.left_chat_member.is_some()
            || self.new_chat_title.is_some()
            || self.new_chat_photo.is_some()
            || self.delete_chat_photo.unwrap_or(false)
            || self.group_chat_created.unwrap_or(false)
    }

    /// Detects the attachment kind carried by this message.
    ///
    /// A single update carries at most one kind; precedence is sticker >
    /// voice > document > animation > photo, then the kinds that only get
    /// a placeholder caption.
    pub fn attachment_kind(&self) -> Option<AttachmentKind> {
        if self.sticker.is_some() {
            Some(AttachmentKind::Sticker)
        } else if self.voice.is_some() {
            Some(AttachmentKind::Voice)
        } else if self.document.is_some() {
            Some(AttachmentKind::Document)
        } else if self.animation.is_some() {
            Some(AttachmentKind::Animation)
        } else if self.photo.is_some() {
            Some(AttachmentKind::Photo)
        } else if self.audio.is_some() {
            Some(AttachmentKind::Audio)
        } else if self.video.is_some() {
            Some(AttachmentKind::Video)
        } else if self.contact.is_some() {
            Some(AttachmentKind::Contact)
        } else if self.location.is_some() {
            Some(AttachmentKind::Location)
        } else {
            None
        }
    }
}

/// Attachment kinds the bridge distinguishes.
///
/// Sticker, voice, document, animation and photo are transcoded to CRM
/// attachments; the rest only produce a localized placeholder text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Sticker,
    Voice,
    Document,
    Animation,
    Photo,
    Audio,
    Video,
    Contact,
    Location,
}

impl AttachmentKind {
    /// Message-catalog key for this kind's placeholder caption.
    pub fn locale_key(self) -> &'static str {
        match self {
            Self::Sticker => "sticker",
            Self::Voice => "voice",
            Self::Document => "document",
            Self::Animation => "animation",
            Self::Photo => "photo",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Contact => "contact",
            Self::Location => "location",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sticker {
    pub file_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Voice {
    pub file_id: String,
    #[serde(default)]
    pub duration: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Audio {
    pub file_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Animation {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Video {
    pub file_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub first_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

/// Result of `getFile`: the path is valid for about an hour.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileInfo {
    pub file_id: String,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Result of `getUserProfilePhotos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfilePhotos {
    #[serde(default)]
    pub total_count: i64,
    #[serde(default)]
    pub photos: Vec<Vec<PhotoSize>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_deserializes_text_message() {
        let json = r#"{
            "update_id": 1,
            "message": {
                "message_id": 77,
                "from": {"id": 42, "first_name": "Ann", "username": "ann"},
                "chat": {"id": 100, "type": "private"},
                "date": 1700000000,
                "text": "hi"
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        let msg = update.message.unwrap();
        assert_eq!(msg.message_id, 77);
        assert_eq!(msg.chat.id, 100);
        assert_eq!(msg.text.as_deref(), Some("hi"));
        assert!(update.edited_message.is_none());
    }

    #[test]
    fn attachment_precedence_sticker_wins() {
        let msg = Message {
            sticker: Some(Sticker { file_id: "s".into() }),
            photo: Some(vec![PhotoSize { file_id: "p".into(), ..Default::default() }]),
            ..Default::default()
        };
        assert_eq!(msg.attachment_kind(), Some(AttachmentKind::Sticker));
    }

    #[test]
    fn attachment_precedence_voice_before_document() {
        let msg = Message {
            voice: Some(Voice { file_id: "v".into(), duration: 3 }),
            document: Some(Document { file_id: "d".into(), ..Default::default() }),
            ..Default::default()
        };
        assert_eq!(msg.attachment_kind(), Some(AttachmentKind::Voice));
    }

    #[test]
    fn plain_text_has_no_attachment_kind() {
        let msg = Message {
            text: Some("hello".into()),
            ..Default::default()
        };
        assert_eq!(msg.attachment_kind(), None);
    }

    #[test]
    fn service_events_are_detected() {
        let join = Message {
            new_chat_members: Some(vec![User { id: 1, ..Default::default() }]),
            ..Default::default()
        };
        assert!(join.is_service_event());

        let title = Message {
            new_chat_title: Some("new title".into()),
            ..Default::default()
        };
        assert!(title.is_service_event());

        let plain = Message {
            text: Some("hi".into()),
            ..Default::default()
        };
        assert!(!plain.is_service_event());
    }
}
