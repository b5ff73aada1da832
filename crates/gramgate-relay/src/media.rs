// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment transcoding between Telegram's file-reference model and the
//! CRM's upload-by-URL / upload-by-stream model.
//!
//! Inbound, sticker/voice/animation are handed to the CRM by URL so the
//! gateway fetches them server-side; photos and documents are downloaded
//! locally first because the bytes may need format normalization (the CRM
//! does not accept WebP, so WebP is re-encoded to PNG). Any failure aborts
//! the whole message send: a text without its promised attachment is worse
//! than no message.

use std::io::Cursor;

use gramgate_crm::TransportClient;
use gramgate_crm::types::{
    FileItem, Item, MSG_TYPE_AUDIO, MSG_TYPE_FILE, MSG_TYPE_IMAGE, SendMessage, WebhookData,
};
use gramgate_telegram::types::{AttachmentKind, Message as TgMessage};
use gramgate_telegram::{TelegramClient, client::InputMediaPhoto};
use image::ImageFormat;
use tracing::{debug, warn};

use gramgate_core::GramgateError;

use crate::locale::Locales;

fn media_err(context: &str, err: impl std::fmt::Display) -> GramgateError {
    GramgateError::Media(format!("{context}: {err}"))
}

/// Resolves the Telegram attachment of `msg` and attaches it to the
/// outbound CRM message.
///
/// Sets the message type, uploads the file through the appropriate CRM
/// endpoint and replaces the text with the Telegram caption. Kinds the CRM
/// cannot carry (audio tracks, contacts, locations, videos) only get a
/// localized placeholder text.
pub async fn attach_inbound(
    telegram: &TelegramClient,
    transport: &TransportClient,
    http: &reqwest::Client,
    locales: &Locales,
    lang: &str,
    msg: &TgMessage,
    send: &mut SendMessage,
) -> Result<(), GramgateError> {
    let Some(kind) = msg.attachment_kind() else {
        send.text = locales.localize(lang, "undefined");
        return Ok(());
    };

    let caption = locales.localize(lang, kind.locale_key());

    enum Route {
        // CRM fetches the file server-side.
        ByUrl { rewrite_mp4: bool },
        // Bytes come through this process for format sniffing.
        Bytes,
    }

    let resolved = match kind {
        AttachmentKind::Sticker => msg
            .sticker
            .as_ref()
            .map(|s| (s.file_id.clone(), Route::ByUrl { rewrite_mp4: false })),
        AttachmentKind::Voice => msg
            .voice
            .as_ref()
            .map(|v| (v.file_id.clone(), Route::ByUrl { rewrite_mp4: false })),
        AttachmentKind::Animation => msg
            .animation
            .as_ref()
            .map(|a| (a.file_id.clone(), Route::ByUrl { rewrite_mp4: true })),
        AttachmentKind::Document => msg
            .document
            .as_ref()
            .map(|d| (d.file_id.clone(), Route::Bytes)),
        // Telegram offers several sizes; the last one is the largest.
        AttachmentKind::Photo => msg
            .photo
            .as_ref()
            .and_then(|sizes| sizes.last())
            .map(|p| (p.file_id.clone(), Route::Bytes)),
        AttachmentKind::Audio
        | AttachmentKind::Video
        | AttachmentKind::Contact
        | AttachmentKind::Location => None,
    };

    let Some((file_id, route)) = resolved else {
        send.text = caption;
        return Ok(());
    };

    send.kind = match kind {
        AttachmentKind::Sticker | AttachmentKind::Photo => MSG_TYPE_IMAGE.to_string(),
        AttachmentKind::Voice => MSG_TYPE_AUDIO.to_string(),
        _ => MSG_TYPE_FILE.to_string(),
    };
    if kind == AttachmentKind::Photo {
        send.note = msg.caption.clone();
    }

    let file_url = telegram
        .get_file_direct_url(&file_id)
        .await
        .map_err(|e| media_err("telegram file resolve", e))?
        .ok_or_else(|| GramgateError::Media(format!("file {file_id} has no download path")))?;

    let item = match route {
        Route::ByUrl { rewrite_mp4: false } => upload_by_url(transport, &file_url, caption).await?,
        Route::ByUrl { rewrite_mp4: true } => {
            // Telegram animations are MP4 containers; the CRM keys the
            // handler off the caption's extension.
            let mut item = upload_by_url(transport, &file_url, caption).await?;
            item.caption = format!("{}.mp4", item.id);
            item
        }
        Route::Bytes => convert_and_upload(transport, http, &file_url).await?,
    };

    debug!(kind = ?kind, item = %item.id, "inbound attachment uploaded");
    send.items = Some(vec![item]);
    send.text = msg.caption.clone().unwrap_or_default();
    Ok(())
}

/// Upload-by-URL: the CRM fetches the file server-side.
async fn upload_by_url(
    transport: &TransportClient,
    url: &str,
    caption: String,
) -> Result<Item, GramgateError> {
    let uploaded = transport
        .upload_file_by_url(url)
        .await
        .map_err(|e| media_err("upload by url", e))?;
    Ok(Item {
        id: uploaded.id,
        caption,
    })
}

/// Download the bytes, sniff the format, normalize WebP to PNG, and
/// upload through the raw-bytes endpoint.
async fn convert_and_upload(
    transport: &TransportClient,
    http: &reqwest::Client,
    url: &str,
) -> Result<Item, GramgateError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| media_err("attachment download", e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(GramgateError::Media(format!(
            "attachment download returned {status}"
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| media_err("attachment body read", e))?;

    let payload = match image::guess_format(&bytes) {
        Ok(ImageFormat::WebP) => {
            let decoded = image::load_from_memory(&bytes)
                .map_err(|e| media_err("webp decode", e))?;
            let mut png = Vec::new();
            decoded
                .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .map_err(|e| media_err("png encode", e))?;
            debug!(original = bytes.len(), converted = png.len(), "webp re-encoded to png");
            png
        }
        _ => bytes.to_vec(),
    };

    let uploaded = transport
        .upload_file(payload)
        .await
        .map_err(|e| media_err("upload stream", e))?;
    Ok(Item {
        id: uploaded.id,
        caption: String::new(),
    })
}

/// Builds and sends the Telegram message for a CRM image event: a single
/// photo by URL, or a media group when the event carries several items.
pub async fn send_photo_event(
    transport: &TransportClient,
    telegram: &TelegramClient,
    chat_id: i64,
    data: &WebhookData,
) -> Result<gramgate_telegram::Message, GramgateError> {
    let items = data
        .items
        .as_deref()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| GramgateError::Validation("wrong_data".into()))?;

    let caption = (!data.content.is_empty()).then(|| data.content.clone());

    if items.len() == 1 {
        let file = transport.get_file(&items[0].id).await?;
        return telegram
            .send_photo_url(chat_id, &file.url, caption.as_deref())
            .await;
    }

    let mut media = Vec::new();
    for item in items {
        match transport.get_file(&item.id).await {
            Ok(file) => media.push(InputMediaPhoto::new(file.url, caption.clone())),
            Err(e) => {
                warn!(file_id = %item.id, error = %e, "skipping unreadable media group item");
            }
        }
    }
    if media.is_empty() {
        return Err(GramgateError::Media("no media group item could be resolved".into()));
    }

    let sent = telegram.send_media_group(chat_id, media).await?;
    sent.into_iter()
        .next()
        .ok_or_else(|| GramgateError::Media("media group send returned no messages".into()))
}

/// Streams a CRM-hosted file into a Telegram document upload, preserving
/// the CRM-reported size and caption.
pub async fn send_document_event(
    transport: &TransportClient,
    telegram: &TelegramClient,
    http: &reqwest::Client,
    chat_id: i64,
    item: &FileItem,
) -> Result<gramgate_telegram::Message, GramgateError> {
    let file = transport.get_file(&item.id).await?;

    let response = http
        .get(&file.url)
        .send()
        .await
        .map_err(|e| media_err("crm file download", e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(GramgateError::Media(format!(
            "crm file download returned {status}"
        )));
    }

    let file_name = item
        .caption
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "file".to_string());

    match item.size.or(file.size).or_else(|| response.content_length()) {
        Some(length) => {
            let body = reqwest::Body::wrap_stream(response.bytes_stream());
            telegram
                .send_document_stream(chat_id, &file_name, length, body)
                .await
        }
        None => {
            // No size reported anywhere; buffer to learn it.
            let bytes = response
                .bytes()
                .await
                .map_err(|e| media_err("crm file body read", e))?;
            let length = bytes.len() as u64;
            telegram
                .send_document_stream(chat_id, &file_name, length, reqwest::Body::from(bytes))
                .await
        }
    }
}
