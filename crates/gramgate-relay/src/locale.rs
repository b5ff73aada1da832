// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Localized message lookup.
//!
//! Phrase tables for en/ru/es are embedded as TOML and loaded once at
//! startup. Lookup falls back to English, then to the key itself, so a
//! missing translation never aborts a relay.

use std::collections::HashMap;

use gramgate_core::GramgateError;

/// Languages the bridge ships catalogs for.
pub const SUPPORTED_LANGS: &[&str] = &["en", "ru", "es"];

const DEFAULT_LANG: &str = "en";

const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en.toml")),
    ("ru", include_str!("../locales/ru.toml")),
    ("es", include_str!("../locales/es.toml")),
];

/// Loaded phrase tables.
#[derive(Debug)]
pub struct Locales {
    tables: HashMap<&'static str, HashMap<String, String>>,
}

impl Locales {
    /// Parse the embedded catalogs.
    pub fn load() -> Result<Self, GramgateError> {
        let mut tables = HashMap::new();
        for (lang, source) in CATALOGS {
            let table: HashMap<String, String> = toml::from_str(source)
                .map_err(|e| GramgateError::Config(format!("locale catalog {lang}: {e}")))?;
            tables.insert(*lang, table);
        }
        Ok(Self { tables })
    }

    /// Reduce an Accept-Language value or Telegram language code to a
    /// supported two-letter code.
    pub fn normalize_lang<'a>(&self, lang: &'a str) -> &'a str {
        let code = lang.get(..2).unwrap_or(DEFAULT_LANG);
        if self.tables.contains_key(code) {
            code
        } else {
            DEFAULT_LANG
        }
    }

    /// Look up `key` in the catalog for `lang`.
    pub fn localize(&self, lang: &str, key: &str) -> String {
        let lang = self.normalize_lang(lang);
        self.tables
            .get(lang)
            .and_then(|t| t.get(key))
            .or_else(|| self.tables.get(DEFAULT_LANG).and_then(|t| t.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Look up `key` and substitute `{name}` placeholders from `args`.
    pub fn localize_with(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let mut message = self.localize(lang, key);
        for (name, value) in args {
            message = message.replace(&format!("{{{name}}}"), value);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_parse_and_cover_all_langs() {
        let locales = Locales::load().unwrap();
        for lang in SUPPORTED_LANGS {
            assert!(!locales.localize(lang, "sticker").is_empty());
        }
    }

    #[test]
    fn lookup_uses_requested_language() {
        let locales = Locales::load().unwrap();
        assert_eq!(locales.localize("en", "sticker"), "sticker");
        assert_eq!(locales.localize("ru", "sticker"), "стикер");
    }

    #[test]
    fn long_codes_are_truncated_and_unknown_falls_back() {
        let locales = Locales::load().unwrap();
        assert_eq!(locales.normalize_lang("ru-RU"), "ru");
        assert_eq!(locales.normalize_lang("de"), "en");
        assert_eq!(locales.normalize_lang(""), "en");
        assert_eq!(locales.localize("de", "order"), "Order");
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        let locales = Locales::load().unwrap();
        assert_eq!(locales.localize("en", "no_such_key"), "no_such_key");
    }

    #[test]
    fn template_substitution() {
        let locales = Locales::load().unwrap();
        let message = locales.localize_with(
            "en",
            "cost_currency",
            &[("amount", "100".to_string()), ("currency", "$".to_string())],
        );
        assert_eq!(message, "100 $");
    }
}
