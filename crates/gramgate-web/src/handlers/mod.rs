// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Webhook handlers answer success-like statuses for conditions that must
//! not trigger upstream retries; the admin API returns localized error
//! strings. Neither surface leaks internal error detail.

mod admin;
mod webhooks;

pub use admin::{
    activity, add_bot, create_connection, delete_bot, get_settings, save_connection, set_bot_lang,
};
pub use webhooks::{crm_webhook, telegram_webhook};

use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use gramgate_core::GramgateError;
use serde::Serialize;

use crate::server::AppState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Primary language from the Accept-Language header, reduced to a
/// supported code.
pub(crate) fn lang_from_headers(state: &AppState, headers: &HeaderMap) -> String {
    let accept = headers
        .get("accept-language")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let primary = accept.split([',', ';']).next().unwrap_or_default().trim();
    state.bridge.locales.normalize_lang(primary).to_string()
}

/// Maps an error to its response: validation and media problems are the
/// caller's fault, upstream and storage failures are ours.
pub(crate) fn error_response(
    state: &AppState,
    lang: &str,
    err: &GramgateError,
) -> (StatusCode, Json<ErrorBody>) {
    let locales = &state.bridge.locales;
    match err {
        GramgateError::Validation(key) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: locales.localize(lang, key),
            }),
        ),
        GramgateError::Media(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: locales.localize(lang, "wrong_data"),
            }),
        ),
        GramgateError::NotFound { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: locales.localize(lang, "wrong_data"),
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: locales.localize(lang, "error_save"),
            }),
        ),
    }
}
