//! Canonical question type codes understood by the export tool.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Question type an item is exported as.
///
/// Serialized as the single-character code used by the authoring tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestionType {
    /// Numeric input (`N`).
    #[serde(rename = "N")]
    Numeric,
    /// Single-line free text (`S`).
    #[serde(rename = "S")]
    ShortText,
    /// Multi-line free text (`T`).
    #[serde(rename = "T")]
    LongText,
    /// Single choice rendered as radio buttons (`L`).
    #[serde(rename = "L")]
    ListRadio,
    /// Single choice rendered as a dropdown (`!`).
    #[serde(rename = "!")]
    ListDropdown,
    /// Array of sub-questions sharing one option set (`F`).
    #[serde(rename = "F")]
    ArrayMatrix,
    /// Numeric slider (`K`).
    #[serde(rename = "K")]
    Slider,
    /// Calculated value, hidden from respondents (`*`).
    #[serde(rename = "*")]
    Equation,
    /// Display-only text (`X`).
    #[serde(rename = "X")]
    Boilerplate,
}

impl QuestionType {
    pub const ALL: [QuestionType; 9] = [
        QuestionType::Numeric,
        QuestionType::ShortText,
        QuestionType::LongText,
        QuestionType::ListRadio,
        QuestionType::ListDropdown,
        QuestionType::ArrayMatrix,
        QuestionType::Slider,
        QuestionType::Equation,
        QuestionType::Boilerplate,
    ];

    /// Returns the tool code for this type.
    pub fn code(&self) -> &'static str {
        match self {
            QuestionType::Numeric => "N",
            QuestionType::ShortText => "S",
            QuestionType::LongText => "T",
            QuestionType::ListRadio => "L",
            QuestionType::ListDropdown => "!",
            QuestionType::ArrayMatrix => "F",
            QuestionType::Slider => "K",
            QuestionType::Equation => "*",
            QuestionType::Boilerplate => "X",
        }
    }

    /// Returns a human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Numeric => "Numeric",
            QuestionType::ShortText => "Short text",
            QuestionType::LongText => "Long text",
            QuestionType::ListRadio => "List (radio)",
            QuestionType::ListDropdown => "List (dropdown)",
            QuestionType::ArrayMatrix => "Array",
            QuestionType::Slider => "Slider",
            QuestionType::Equation => "Equation",
            QuestionType::Boilerplate => "Text display",
        }
    }

    /// True for single-choice list types.
    pub fn is_list(&self) -> bool {
        matches!(self, QuestionType::ListRadio | QuestionType::ListDropdown)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = ModelError;

    /// Parse either a tool code (`N`, `!`, ...) or a type name
    /// (`numeric`, `list_dropdown`, ...), case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(question_type) = QuestionType::ALL
            .into_iter()
            .find(|question_type| question_type.code() == trimmed)
        {
            return Ok(question_type);
        }
        let normalized = trimmed.to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "numeric" | "numerical" => Ok(QuestionType::Numeric),
            "short_text" | "shorttext" => Ok(QuestionType::ShortText),
            "long_text" | "longtext" => Ok(QuestionType::LongText),
            "list_radio" | "listradio" | "radio" => Ok(QuestionType::ListRadio),
            "list_dropdown" | "listdropdown" | "dropdown" => Ok(QuestionType::ListDropdown),
            "array" | "array_matrix" | "arraymatrix" | "matrix" => Ok(QuestionType::ArrayMatrix),
            "slider" => Ok(QuestionType::Slider),
            "equation" => Ok(QuestionType::Equation),
            "boilerplate" | "text_display" => Ok(QuestionType::Boilerplate),
            _ => Err(ModelError::UnknownQuestionType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_and_names() {
        assert_eq!("N".parse::<QuestionType>().unwrap(), QuestionType::Numeric);
        assert_eq!("!".parse::<QuestionType>().unwrap(), QuestionType::ListDropdown);
        assert_eq!(
            "List-Dropdown".parse::<QuestionType>().unwrap(),
            QuestionType::ListDropdown
        );
        assert_eq!("long text".parse::<QuestionType>().unwrap(), QuestionType::LongText);
    }

    #[test]
    fn rejects_unknown_types() {
        assert!(matches!(
            "ranking".parse::<QuestionType>(),
            Err(ModelError::UnknownQuestionType(_))
        ));
    }

    #[test]
    fn serializes_as_tool_code() {
        let json = serde_json::to_string(&QuestionType::Equation).unwrap();
        assert_eq!(json, r#""*""#);
        let round: QuestionType = serde_json::from_str(r#""F""#).unwrap();
        assert_eq!(round, QuestionType::ArrayMatrix);
    }

    #[test]
    fn every_code_round_trips_through_from_str() {
        for question_type in QuestionType::ALL {
            assert_eq!(question_type.code().parse::<QuestionType>(), Ok(question_type));
        }
    }
}
