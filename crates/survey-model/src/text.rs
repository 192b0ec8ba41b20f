//! Multilingual text and the language fallback chain.
//!
//! Template files carry text either as a plain string or as a mapping from
//! language code to string. [`resolve_text`] is the single lookup used by the
//! preview and by matrix heading derivation.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Language consulted when the requested language has no entry.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Text that is either language-neutral or keyed by language code.
///
/// Localized entries keep their insertion order, which is the last step of
/// the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MultilingualText {
    Plain(String),
    Localized(IndexMap<String, String>),
}

impl Default for MultilingualText {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

impl MultilingualText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain(text.into())
    }

    pub fn localized<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Localized(
            entries
                .into_iter()
                .map(|(lang, text)| (lang.into(), text.into()))
                .collect(),
        )
    }

    /// True when no language resolves to non-blank text.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Plain(text) => text.trim().is_empty(),
            Self::Localized(map) => map.values().all(|text| text.trim().is_empty()),
        }
    }

    /// Language codes present in this text (empty for plain text).
    pub fn languages(&self) -> Vec<&str> {
        match self {
            Self::Plain(_) => Vec::new(),
            Self::Localized(map) => map.keys().map(String::as_str).collect(),
        }
    }

    pub fn resolve(&self, language: &str) -> String {
        resolve_text(self, language)
    }

    /// Convert a loosely-typed JSON value. Anything that is neither a string
    /// nor an object resolves to empty text.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Plain(text),
            Value::Object(map) => Self::Localized(
                map.into_iter()
                    .filter_map(|(lang, text)| scalar_to_string(text).map(|text| (lang, text)))
                    .collect(),
            ),
            Value::Number(number) => Self::Plain(number.to_string()),
            _ => Self::default(),
        }
    }
}

impl From<&str> for MultilingualText {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_string())
    }
}

impl From<String> for MultilingualText {
    fn from(value: String) -> Self {
        Self::Plain(value)
    }
}

impl<'de> Deserialize<'de> for MultilingualText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(value))
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Resolve text for display in `language`.
///
/// Plain text is returned unchanged. Localized text tries the requested
/// language, then [`FALLBACK_LANGUAGE`], then the first entry in insertion
/// order, then the empty string.
pub fn resolve_text(text: &MultilingualText, language: &str) -> String {
    match text {
        MultilingualText::Plain(text) => text.clone(),
        MultilingualText::Localized(map) => map
            .get(language)
            .or_else(|| map.get(FALLBACK_LANGUAGE))
            .or_else(|| map.values().next())
            .cloned()
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_language_wins() {
        let text = MultilingualText::localized([("en", "A"), ("de", "B")]);
        assert_eq!(resolve_text(&text, "de"), "B");
    }

    #[test]
    fn falls_back_to_english_then_first_entry() {
        let text = MultilingualText::localized([("en", "A"), ("de", "B")]);
        assert_eq!(resolve_text(&text, "fr"), "A");

        let text = MultilingualText::localized([("de", "B"), ("es", "C")]);
        assert_eq!(resolve_text(&text, "fr"), "B");
    }

    #[test]
    fn plain_text_is_returned_unchanged() {
        assert_eq!(resolve_text(&MultilingualText::plain("plain"), "fr"), "plain");
    }

    #[test]
    fn empty_mapping_resolves_to_empty_string() {
        let text = MultilingualText::Localized(IndexMap::new());
        assert_eq!(resolve_text(&text, "fr"), "");
        assert!(text.is_empty());
    }

    #[test]
    fn deserializes_plain_and_localized_forms() {
        let plain: MultilingualText = serde_json::from_str(r#""Hello""#).unwrap();
        assert_eq!(plain, MultilingualText::plain("Hello"));

        let localized: MultilingualText =
            serde_json::from_str(r#"{"de": "Hallo", "en": "Hello"}"#).unwrap();
        assert_eq!(localized.languages(), vec!["de", "en"]);
        assert_eq!(localized.resolve("fr"), "Hello");
    }

    #[test]
    fn malformed_values_degrade_to_empty() {
        let text: MultilingualText = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(text, MultilingualText::default());
        let text: MultilingualText = serde_json::from_str("null").unwrap();
        assert_eq!(text.resolve("en"), "");
    }
}
