//! Per-item tool overrides.
//!
//! Overrides are a closed set of typed fields. Each [`OverrideKey`] declares
//! the kind of value it holds and the question types it applies to, so a
//! field that makes no sense for an item's type is rejected when it is set
//! and dropped when the item is exported.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::ModelError;
use crate::question_type::QuestionType;

/// Kind of value an override field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Integer,
    Number,
    Flag,
    Type,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::Flag => "flag",
            ValueKind::Type => "question type",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Override field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKey {
    // Any question type
    QuestionType,
    Help,
    Hidden,
    PageBreak,
    CssClass,
    // Numeric input
    MinNumValue,
    MaxNumValue,
    NumValueIntOnly,
    Prefix,
    Suffix,
    // Free text
    MaximumChars,
    DisplayRows,
    TextInputWidth,
    // Lists
    DisplayColumns,
    OtherReplaceText,
    DropdownSize,
    DropdownPrefix,
    // Arrays
    AnswerWidth,
    RepeatHeadings,
    // Sliders
    SliderMin,
    SliderMax,
    SliderAccuracy,
    SliderDefault,
    // Equations
    Equation,
}

impl OverrideKey {
    pub const ALL: [OverrideKey; 24] = [
        OverrideKey::QuestionType,
        OverrideKey::Help,
        OverrideKey::Hidden,
        OverrideKey::PageBreak,
        OverrideKey::CssClass,
        OverrideKey::MinNumValue,
        OverrideKey::MaxNumValue,
        OverrideKey::NumValueIntOnly,
        OverrideKey::Prefix,
        OverrideKey::Suffix,
        OverrideKey::MaximumChars,
        OverrideKey::DisplayRows,
        OverrideKey::TextInputWidth,
        OverrideKey::DisplayColumns,
        OverrideKey::OtherReplaceText,
        OverrideKey::DropdownSize,
        OverrideKey::DropdownPrefix,
        OverrideKey::AnswerWidth,
        OverrideKey::RepeatHeadings,
        OverrideKey::SliderMin,
        OverrideKey::SliderMax,
        OverrideKey::SliderAccuracy,
        OverrideKey::SliderDefault,
        OverrideKey::Equation,
    ];

    /// Canonical field name as written in payloads and edit scripts.
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideKey::QuestionType => "question_type",
            OverrideKey::Help => "help",
            OverrideKey::Hidden => "hidden",
            OverrideKey::PageBreak => "page_break",
            OverrideKey::CssClass => "css_class",
            OverrideKey::MinNumValue => "min_num_value",
            OverrideKey::MaxNumValue => "max_num_value",
            OverrideKey::NumValueIntOnly => "num_value_int_only",
            OverrideKey::Prefix => "prefix",
            OverrideKey::Suffix => "suffix",
            OverrideKey::MaximumChars => "maximum_chars",
            OverrideKey::DisplayRows => "display_rows",
            OverrideKey::TextInputWidth => "text_input_width",
            OverrideKey::DisplayColumns => "display_columns",
            OverrideKey::OtherReplaceText => "other_replace_text",
            OverrideKey::DropdownSize => "dropdown_size",
            OverrideKey::DropdownPrefix => "dropdown_prefix",
            OverrideKey::AnswerWidth => "answer_width",
            OverrideKey::RepeatHeadings => "repeat_headings",
            OverrideKey::SliderMin => "slider_min",
            OverrideKey::SliderMax => "slider_max",
            OverrideKey::SliderAccuracy => "slider_accuracy",
            OverrideKey::SliderDefault => "slider_default",
            OverrideKey::Equation => "equation",
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            OverrideKey::QuestionType => ValueKind::Type,
            OverrideKey::Help
            | OverrideKey::CssClass
            | OverrideKey::Prefix
            | OverrideKey::Suffix
            | OverrideKey::OtherReplaceText
            | OverrideKey::SliderDefault
            | OverrideKey::Equation => ValueKind::Text,
            OverrideKey::Hidden | OverrideKey::PageBreak | OverrideKey::NumValueIntOnly => {
                ValueKind::Flag
            }
            OverrideKey::MaximumChars
            | OverrideKey::DisplayRows
            | OverrideKey::TextInputWidth
            | OverrideKey::DisplayColumns
            | OverrideKey::DropdownSize
            | OverrideKey::DropdownPrefix
            | OverrideKey::AnswerWidth
            | OverrideKey::RepeatHeadings => ValueKind::Integer,
            OverrideKey::MinNumValue
            | OverrideKey::MaxNumValue
            | OverrideKey::SliderMin
            | OverrideKey::SliderMax
            | OverrideKey::SliderAccuracy => ValueKind::Number,
        }
    }

    /// Whether the field is meaningful for a question of `question_type`.
    pub fn applies_to(&self, question_type: QuestionType) -> bool {
        use QuestionType as Q;
        match self {
            OverrideKey::QuestionType
            | OverrideKey::Help
            | OverrideKey::Hidden
            | OverrideKey::PageBreak
            | OverrideKey::CssClass => true,
            OverrideKey::MinNumValue
            | OverrideKey::MaxNumValue
            | OverrideKey::NumValueIntOnly => question_type == Q::Numeric,
            OverrideKey::Prefix | OverrideKey::Suffix | OverrideKey::TextInputWidth => {
                matches!(question_type, Q::Numeric | Q::ShortText)
            }
            OverrideKey::MaximumChars => {
                matches!(question_type, Q::Numeric | Q::ShortText | Q::LongText)
            }
            OverrideKey::DisplayRows => question_type == Q::LongText,
            OverrideKey::DisplayColumns => question_type == Q::ListRadio,
            OverrideKey::OtherReplaceText => question_type.is_list(),
            OverrideKey::DropdownSize | OverrideKey::DropdownPrefix => {
                question_type == Q::ListDropdown
            }
            OverrideKey::AnswerWidth | OverrideKey::RepeatHeadings => {
                question_type == Q::ArrayMatrix
            }
            OverrideKey::SliderMin
            | OverrideKey::SliderMax
            | OverrideKey::SliderAccuracy
            | OverrideKey::SliderDefault => question_type == Q::Slider,
            OverrideKey::Equation => question_type == Q::Equation,
        }
    }

    /// Whether the field is meaningful for an item of `question_type`.
    ///
    /// An item rendered as a row of a matrix also accepts the array fields.
    pub fn applies_to_item(&self, question_type: QuestionType, in_matrix: bool) -> bool {
        self.applies_to(question_type) || (in_matrix && self.applies_to(QuestionType::ArrayMatrix))
    }

    /// Fields that can be edited for a question of `question_type`.
    pub fn fields_for(question_type: QuestionType) -> Vec<OverrideKey> {
        OverrideKey::ALL
            .into_iter()
            .filter(|key| key.applies_to(question_type))
            .collect()
    }
}

impl fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverrideKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        OverrideKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownOverrideKey(s.to_string()))
    }
}

/// A typed override value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Flag(bool),
    Integer(i64),
    Number(f64),
    Type(QuestionType),
    Text(String),
}

impl OverrideValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            OverrideValue::Flag(_) => ValueKind::Flag,
            OverrideValue::Integer(_) => ValueKind::Integer,
            OverrideValue::Number(_) => ValueKind::Number,
            OverrideValue::Type(_) => ValueKind::Type,
            OverrideValue::Text(_) => ValueKind::Text,
        }
    }

    /// Empty text and `false` carry no information and clear the field.
    pub fn is_falsy(&self) -> bool {
        match self {
            OverrideValue::Flag(flag) => !flag,
            OverrideValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Convert into the representation `key` stores, if compatible.
    ///
    /// Integers widen to numbers and type codes or names parse into
    /// [`QuestionType`]; anything else must already be the right kind.
    pub fn coerce_for(self, key: OverrideKey) -> Result<Self, ModelError> {
        let expected = key.kind();
        let found = self.kind();
        match (expected, self) {
            (ValueKind::Number, OverrideValue::Integer(value)) => {
                Ok(OverrideValue::Number(value as f64))
            }
            (ValueKind::Integer, OverrideValue::Number(value))
                if value.fract() == 0.0 && value.is_finite() =>
            {
                Ok(OverrideValue::Integer(value as i64))
            }
            (ValueKind::Type, OverrideValue::Text(text)) => text
                .parse::<QuestionType>()
                .map(OverrideValue::Type)
                .map_err(|_| ModelError::OverrideKind {
                    key,
                    expected,
                    found: ValueKind::Text,
                }),
            (ValueKind::Text, OverrideValue::Type(question_type)) => {
                Ok(OverrideValue::Text(question_type.code().to_string()))
            }
            (_, value) if value.kind() == expected => Ok(value),
            _ => Err(ModelError::OverrideKind {
                key,
                expected,
                found,
            }),
        }
    }

    pub fn as_question_type(&self) -> Option<QuestionType> {
        match self {
            OverrideValue::Type(question_type) => Some(*question_type),
            _ => None,
        }
    }

    /// Read a loosely typed JSON value. `null`, arrays and objects have no
    /// override representation.
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(flag) => Some(OverrideValue::Flag(*flag)),
            Value::Number(number) => number
                .as_i64()
                .map(OverrideValue::Integer)
                .or_else(|| number.as_f64().map(OverrideValue::Number)),
            Value::String(text) => Some(OverrideValue::Text(text.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl From<bool> for OverrideValue {
    fn from(value: bool) -> Self {
        OverrideValue::Flag(value)
    }
}

impl From<i64> for OverrideValue {
    fn from(value: i64) -> Self {
        OverrideValue::Integer(value)
    }
}

impl From<f64> for OverrideValue {
    fn from(value: f64) -> Self {
        OverrideValue::Number(value)
    }
}

impl From<&str> for OverrideValue {
    fn from(value: &str) -> Self {
        OverrideValue::Text(value.to_string())
    }
}

impl From<QuestionType> for OverrideValue {
    fn from(value: QuestionType) -> Self {
        OverrideValue::Type(value)
    }
}

/// Override fields set on one item.
///
/// Only contentful values are stored: assigning a falsy value removes the
/// field instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ItemOverrides(BTreeMap<OverrideKey, OverrideValue>);

impl ItemOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: OverrideKey) -> Option<&OverrideValue> {
        self.0.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (OverrideKey, &OverrideValue)> {
        self.0.iter().map(|(key, value)| (*key, value))
    }

    /// The explicit question type override, if any.
    pub fn question_type(&self) -> Option<QuestionType> {
        self.get(OverrideKey::QuestionType)
            .and_then(OverrideValue::as_question_type)
    }

    /// Merge `value` into the overrides.
    ///
    /// Returns `true` when the stored state changed.
    pub fn set(&mut self, key: OverrideKey, value: OverrideValue) -> Result<bool, ModelError> {
        if value.is_falsy() {
            return Ok(self.0.remove(&key).is_some());
        }
        let value = value.coerce_for(key)?;
        if self.0.get(&key) == Some(&value) {
            return Ok(false);
        }
        self.0.insert(key, value);
        Ok(true)
    }

    pub fn remove(&mut self, key: OverrideKey) -> Option<OverrideValue> {
        self.0.remove(&key)
    }

    /// Copy of the fields that apply to an item of `question_type`, see
    /// [`OverrideKey::applies_to_item`].
    pub fn applicable_to(&self, question_type: QuestionType, in_matrix: bool) -> ItemOverrides {
        ItemOverrides(
            self.0
                .iter()
                .filter(|(key, _)| key.applies_to_item(question_type, in_matrix))
                .map(|(key, value)| (*key, value.clone()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ItemOverrides {
    /// Malformed entries are dropped with a warning so one bad field never
    /// rejects the surrounding item.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut overrides = ItemOverrides::new();
        let raw = match Value::deserialize(deserializer)? {
            Value::Object(raw) => raw,
            Value::Null => return Ok(overrides),
            other => {
                warn!(value = %other, "dropping overrides that are not an object");
                return Ok(overrides);
            }
        };
        for (name, raw_value) in raw {
            let key = match name.parse::<OverrideKey>() {
                Ok(key) => key,
                Err(error) => {
                    warn!(field = %name, %error, "dropping override");
                    continue;
                }
            };
            let Some(value) = OverrideValue::from_json(&raw_value) else {
                warn!(
                    field = %name,
                    value = %raw_value,
                    "dropping override without a usable value"
                );
                continue;
            };
            if let Err(error) = overrides.set(key, value) {
                warn!(field = %name, %error, "dropping override");
            }
        }
        Ok(overrides)
    }
}
