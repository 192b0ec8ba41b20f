//! Question type detection.

use survey_model::{Item, QuestionType};

/// Items with more options than this are shown as dropdowns.
pub const DROPDOWN_LEVEL_THRESHOLD: usize = 10;

/// Classify an item into the question type it is exported as.
///
/// First match wins:
/// 1. question type override
/// 2. type requested by the template's tool section (unparsable values are ignored)
/// 3. input hint: calculated/calculation, numerical, slider, dropdown
/// 4. more than [`DROPDOWN_LEVEL_THRESHOLD`] levels
/// 5. `text` hint, split on the multiline flag
/// 6. list when levels exist, long text otherwise
pub fn detect_type(item: &Item) -> QuestionType {
    if let Some(question_type) = item.overrides.question_type() {
        return question_type;
    }
    if let Some(question_type) = item
        .tool_type
        .as_deref()
        .and_then(|hint| hint.parse::<QuestionType>().ok())
    {
        return question_type;
    }

    let hint = item.input_hint();
    if item.calculation || hint.as_deref() == Some("calculated") {
        return QuestionType::Equation;
    }
    match hint.as_deref() {
        Some("numerical") => return QuestionType::Numeric,
        Some("slider") => return QuestionType::Slider,
        Some("dropdown") => return QuestionType::ListDropdown,
        _ => {}
    }

    if item.levels.len() > DROPDOWN_LEVEL_THRESHOLD {
        return QuestionType::ListDropdown;
    }
    if hint.as_deref() == Some("text") {
        return if item.multiline {
            QuestionType::LongText
        } else {
            QuestionType::ShortText
        };
    }
    if item.levels.is_empty() {
        QuestionType::LongText
    } else {
        QuestionType::ListRadio
    }
}
