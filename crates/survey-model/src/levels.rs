//! Response levels and their canonical signature.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::text::MultilingualText;

/// Response options of an item: level key to label, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Levels(IndexMap<String, MultilingualText>);

impl Levels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<MultilingualText>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(key, label)| (key.into(), label.into()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MultilingualText)> {
        self.0.iter().map(|(key, label)| (key.as_str(), label))
    }

    /// Canonical signature used to test level equality between items.
    ///
    /// Keys are sorted, and localized labels are sorted by language, so two
    /// items with the same options in a different declaration order share a
    /// signature. Empty level sets have no signature.
    pub fn signature(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        let canonical: BTreeMap<&str, CanonicalLabel<'_>> = self
            .0
            .iter()
            .map(|(key, label)| (key.as_str(), CanonicalLabel::from(label)))
            .collect();
        serde_json::to_string(&canonical).ok()
    }
}

impl<'de> Deserialize<'de> for Levels {
    /// Anything other than a JSON object deserializes to an empty level set.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let Value::Object(map) = value else {
            return Ok(Self::default());
        };
        Ok(Self(
            map.into_iter()
                .map(|(key, label)| (key, MultilingualText::from_json(label)))
                .collect(),
        ))
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum CanonicalLabel<'a> {
    Plain(&'a str),
    Localized(BTreeMap<&'a str, &'a str>),
}

impl<'a> From<&'a MultilingualText> for CanonicalLabel<'a> {
    fn from(label: &'a MultilingualText) -> Self {
        match label {
            MultilingualText::Plain(text) => Self::Plain(text),
            MultilingualText::Localized(map) => Self::Localized(
                map.iter()
                    .map(|(lang, text)| (lang.as_str(), text.as_str()))
                    .collect(),
            ),
        }
    }
}
